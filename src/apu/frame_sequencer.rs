use crate::SystemControl;

// NTSC frame sequencer boundaries, in CPU cycles
const STEP_1: u32 = 7457;
const STEP_2: u32 = 14913;
const STEP_3: u32 = 22371;
const STEP_4: u32 = 29829;
const MODE_0_WRAP: u32 = 29830;
const STEP_5: u32 = 37281;
const MODE_1_WRAP: u32 = 37282;

/// A unit update fired by the frame sequencer. Half-frame events imply the
/// quarter-frame work as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    Quarter,
    Half,
}

/// Divides the CPU clock into the periodic envelope/length/sweep update
/// events, in 4-step or 5-step mode. The last step of 4-step mode raises
/// the frame interrupt unless inhibited.
pub struct FrameSequencer {
    pub mode_5_step: bool,
    pub irq_inhibit: bool,

    cycles: u32,
}

impl SystemControl for FrameSequencer {
    fn reset(&mut self) {
        self.mode_5_step = false;
        self.irq_inhibit = false;
        self.cycles = 0;
    }
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self {
            mode_5_step: false,
            irq_inhibit: false,
            cycles: 0,
        }
    }

    pub fn restart(&mut self) {
        self.cycles = 0;
    }

    pub fn clock(&mut self, irq_flag: &mut bool) -> Option<SequencerEvent> {
        self.cycles += 1;

        if self.mode_5_step {
            match self.cycles {
                STEP_1 | STEP_3 => Some(SequencerEvent::Quarter),
                STEP_2 => Some(SequencerEvent::Half),
                STEP_5 => Some(SequencerEvent::Half),
                MODE_1_WRAP => {
                    self.cycles = 0;
                    None
                }
                _ => None,
            }
        } else {
            match self.cycles {
                STEP_1 | STEP_3 => Some(SequencerEvent::Quarter),
                STEP_2 => Some(SequencerEvent::Half),
                STEP_4 => {
                    if !self.irq_inhibit {
                        *irq_flag = true;
                    }
                    Some(SequencerEvent::Half)
                }
                MODE_0_WRAP => {
                    self.cycles = 0;
                    None
                }
                _ => None,
            }
        }
    }
}
