//! # Engine Configuration
//!
//! | Knob                    | Default      | Effect                                     |
//! |-------------------------|--------------|--------------------------------------------|
//! | [`WaitPolicy`]          | `Unbounded`  | How long to poll the VDP `CE` status bit   |
//! | [`PAINT_STACK_CAPACITY`]| 128 spans    | Bound on pending flood-fill spans          |
//!
//! The stock firmware polls forever; a hung VDP hangs the program. Choosing
//! [`WaitPolicy::Bounded`] turns that into a logged, abandoned command.
//!
//! [`PAINT_STACK_CAPACITY`]: crate::paint::PAINT_STACK_CAPACITY

/// How long a command submission polls the command-executing flag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Poll until the VDP reports completion, however long that takes.
    #[default]
    Unbounded,
    /// Give up after this many status reads.
    Bounded { polls: u32 },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GfxConfig {
    pub wait: WaitPolicy,
}

impl GfxConfig {
    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }
}
