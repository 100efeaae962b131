//! Homing state definitions

/// Homing phases in execution order
///
/// The derived ordering follows the sequence, so a later phase always
/// compares greater than an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// Axis A seeks its endstop at coarse speed
    SeekACoarse,
    /// Axis A retreats from the coarse endstop hit
    BackoffA,
    /// Axis A seeks its endstop again at fine speed
    SeekAFine,
    /// Axis A moves to its calibrated maximum
    MoveToBEnd,
    /// Axis B moves to a point just short of its endstop
    ApproachBSwitch,
    /// Axis B seeks until its endstop triggers
    FindBRisingEdge,
    /// Axis B keeps seeking until its endstop releases
    FindBFallingEdge,
    /// Both axes move to their final targets
    MoveToZero,
    /// Homing complete
    Finished,
}

impl HomingPhase {
    /// All phases in execution order
    pub const ALL: [HomingPhase; 9] = [
        HomingPhase::SeekACoarse,
        HomingPhase::BackoffA,
        HomingPhase::SeekAFine,
        HomingPhase::MoveToBEnd,
        HomingPhase::ApproachBSwitch,
        HomingPhase::FindBRisingEdge,
        HomingPhase::FindBFallingEdge,
        HomingPhase::MoveToZero,
        HomingPhase::Finished,
    ];

    /// Position of this phase in the sequence (0-based)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The phase that follows this one, `None` for `Finished`
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() as usize + 1).copied()
    }

    /// Check if this is the terminal phase
    pub fn is_finished(self) -> bool {
        self == HomingPhase::Finished
    }
}

/// Direction axis B travels to approach its endstop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApproachDirection {
    /// Travel towards positive positions
    Positive,
    /// Travel towards negative positions
    Negative,
    /// B read exactly zero; no seek direction can be chosen
    ///
    /// The fine search then runs at zero speed and only completes if the
    /// endstop is already triggered.
    Stationary,
}

impl ApproachDirection {
    /// Pick the direction that heads back across zero from `position`
    ///
    /// Negative positions approach positively and vice versa; an exact
    /// zero (or NaN) yields `Stationary`.
    pub fn from_position(position: f32) -> Self {
        if position < 0.0 {
            ApproachDirection::Positive
        } else if position > 0.0 {
            ApproachDirection::Negative
        } else {
            ApproachDirection::Stationary
        }
    }

    /// Numeric sign: +1, -1 or 0
    pub fn sign(self) -> f32 {
        match self {
            ApproachDirection::Positive => 1.0,
            ApproachDirection::Negative => -1.0,
            ApproachDirection::Stationary => 0.0,
        }
    }
}

/// Result of the B endstop edge search
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeCalibration {
    /// B position where the endstop triggered
    pub rising_edge: f32,
    /// B position where the endstop released
    pub falling_edge: f32,
    /// Value the B encoder was re-zeroed to
    pub calibrated: f32,
}

impl EdgeCalibration {
    /// Compute the calibration from both edges and the B endstop reference
    pub fn new(rising_edge: f32, falling_edge: f32, b_endstop_position: f32) -> Self {
        Self {
            rising_edge,
            falling_edge,
            calibrated: (falling_edge - rising_edge) / 2.0 + b_endstop_position,
        }
    }
}

/// Homing state, carrying the transient values each phase needs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    SeekACoarse,
    BackoffA,
    SeekAFine,
    MoveToBEnd,
    ApproachBSwitch { dir: ApproachDirection },
    FindBRisingEdge,
    FindBFallingEdge { rising_edge: f32 },
    MoveToZero { calibration: EdgeCalibration },
    Finished { calibration: EdgeCalibration },
}

impl HomingState {
    /// Diagnostic phase of this state
    pub fn phase(&self) -> HomingPhase {
        match self {
            HomingState::SeekACoarse => HomingPhase::SeekACoarse,
            HomingState::BackoffA => HomingPhase::BackoffA,
            HomingState::SeekAFine => HomingPhase::SeekAFine,
            HomingState::MoveToBEnd => HomingPhase::MoveToBEnd,
            HomingState::ApproachBSwitch { .. } => HomingPhase::ApproachBSwitch,
            HomingState::FindBRisingEdge => HomingPhase::FindBRisingEdge,
            HomingState::FindBFallingEdge { .. } => HomingPhase::FindBFallingEdge,
            HomingState::MoveToZero { .. } => HomingPhase::MoveToZero,
            HomingState::Finished { .. } => HomingPhase::Finished,
        }
    }

    /// B edge calibration, once it has been computed
    pub fn calibration(&self) -> Option<EdgeCalibration> {
        match self {
            HomingState::MoveToZero { calibration } | HomingState::Finished { calibration } => {
                Some(*calibration)
            }
            _ => None,
        }
    }
}
