//! Fixed routing tables used when building a mix matrix.

use crate::channels::ChannelRole::{self, *};

/// Redistributes one source role over a set of target roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DownmixRule {
    pub source: ChannelRole,
    pub targets: &'static [ChannelRole],
    /// Only fires when every target is in the destination layout.
    pub guarded: bool,
}

const fn rule(source: ChannelRole, targets: &'static [ChannelRole]) -> DownmixRule {
    DownmixRule {
        source,
        targets,
        guarded: false,
    }
}

const fn guarded(source: ChannelRole, targets: &'static [ChannelRole]) -> DownmixRule {
    DownmixRule {
        source,
        targets,
        guarded: true,
    }
}

/// Downmix cascade, evaluated top to bottom exactly once.
///
/// Top layer folds into the ear-level layer first, then outer and rear
/// channels fold forwards. Guarded rules let back and side pairs stand in
/// for each other before either falls back to the fronts.
pub(crate) const DOWNMIX_RULES: [DownmixRule; 23] = [
    rule(TBC, &[TBL, TBR]),
    rule(TC, &[TFL, TFR, TBL, TBR]),
    rule(TFC, &[TFL, TFR]),
    rule(TBL, &[BL]),
    rule(TBR, &[BR]),
    rule(TFL, &[FL]),
    rule(TFR, &[FR]),
    rule(LFE, &[FL, FR]),
    rule(FLOC, &[FL, FC]),
    rule(FROC, &[FR, FC]),
    rule(BLOC, &[BL]),
    rule(BROC, &[BR]),
    rule(BC, &[BL, BR]),
    guarded(BL, &[SL]),
    guarded(BR, &[SR]),
    guarded(SL, &[BL]),
    guarded(SR, &[BR]),
    rule(BL, &[FL]),
    rule(BR, &[FR]),
    rule(SL, &[FL]),
    rule(SR, &[FR]),
    guarded(FL, &[FC]),
    guarded(FR, &[FC]),
];

/// Substitutes for an unrepresentable front centre, in preference order.
///
/// The first list whose roles are all in the destination wins.
pub(crate) const CENTER_SUBSTITUTES: [&[ChannelRole]; 6] = [
    &[TFC, FL, FR],
    &[TFC],
    &[FLOC, FROC],
    &[TC, FL, FR],
    &[FL, FR],
    &[TFL, TFR],
];

/// Stereo upmix clones as `(origin, clone)` pairs.
pub(crate) const UPMIX_CLONES: [(ChannelRole, ChannelRole); 4] = [(FL, BL), (FR, BR), (FL, SL), (FR, SR)];
