//! Channel roles and channel layouts.
//!
//! A [`ChannelLayout`] is an ordered, duplicate-free list of [`ChannelRole`]s.
//! The position of a role in the layout is its interleave position within a
//! frame, so two layouts are only equal when they hold the same roles in the
//! same order.
//!
//! ```rust
//! use pcm_remap::{ChannelLayout, ChannelRole, StdLayout};
//!
//! let surround = ChannelLayout::from(StdLayout::Layout5_1);
//! assert_eq!(surround.len(), 6);
//! assert_eq!(surround.index_of(ChannelRole::LFE), Some(3));
//!
//! let parsed: ChannelLayout = "FL,FR,FC,LFE,BL,BR".parse().unwrap();
//! assert_eq!(parsed, surround);
//! ```

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LayoutError, PcmError, PcmResult};

/// A logical speaker position.
///
/// The set is closed; [`ChannelRole::COUNT`] is the number of roles and
/// [`ChannelRole::index`] gives each role a dense index for table lookups.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelRole {
    /// Raw bitstream carried without decoding.
    Raw,
    /// Front left.
    FL,
    /// Front right.
    FR,
    /// Front centre.
    FC,
    /// Low-frequency effects.
    LFE,
    /// Back left.
    BL,
    /// Back right.
    BR,
    /// Front left of centre.
    FLOC,
    /// Front right of centre.
    FROC,
    /// Back centre.
    BC,
    /// Side left.
    SL,
    /// Side right.
    SR,
    /// Top front left.
    TFL,
    /// Top front right.
    TFR,
    /// Top front centre.
    TFC,
    /// Top centre.
    TC,
    /// Top back left.
    TBL,
    /// Top back right.
    TBR,
    /// Top back centre.
    TBC,
    /// Back left of centre.
    BLOC,
    /// Back right of centre.
    BROC,
}

impl ChannelRole {
    /// Number of distinct roles.
    pub const COUNT: usize = 21;

    /// Every role, in index order.
    pub const ALL: [ChannelRole; Self::COUNT] = [
        Self::Raw,
        Self::FL,
        Self::FR,
        Self::FC,
        Self::LFE,
        Self::BL,
        Self::BR,
        Self::FLOC,
        Self::FROC,
        Self::BC,
        Self::SL,
        Self::SR,
        Self::TFL,
        Self::TFR,
        Self::TFC,
        Self::TC,
        Self::TBL,
        Self::TBR,
        Self::TBC,
        Self::BLOC,
        Self::BROC,
    ];

    /// Dense index of this role, in `0..COUNT`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name, e.g. `"FL"`.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::FL => "FL",
            Self::FR => "FR",
            Self::FC => "FC",
            Self::LFE => "LFE",
            Self::BL => "BL",
            Self::BR => "BR",
            Self::FLOC => "FLOC",
            Self::FROC => "FROC",
            Self::BC => "BC",
            Self::SL => "SL",
            Self::SR => "SR",
            Self::TFL => "TFL",
            Self::TFR => "TFR",
            Self::TFC => "TFC",
            Self::TC => "TC",
            Self::TBL => "TBL",
            Self::TBR => "TBR",
            Self::TBC => "TBC",
            Self::BLOC => "BLOC",
            Self::BROC => "BROC",
        }
    }

    /// Human readable name, e.g. `"front left"`.
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::FL => "front left",
            Self::FR => "front right",
            Self::FC => "front center",
            Self::LFE => "low frequency",
            Self::BL => "back left",
            Self::BR => "back right",
            Self::FLOC => "front left of center",
            Self::FROC => "front right of center",
            Self::BC => "back center",
            Self::SL => "side left",
            Self::SR => "side right",
            Self::TFL => "top front left",
            Self::TFR => "top front right",
            Self::TFC => "top front center",
            Self::TC => "top center",
            Self::TBL => "top back left",
            Self::TBR => "top back right",
            Self::TBC => "top back center",
            Self::BLOC => "back left of center",
            Self::BROC => "back right of center",
        }
    }

    /// Returns true for the height (top) layer.
    pub const fn is_top(self) -> bool {
        matches!(
            self,
            Self::TFL | Self::TFR | Self::TFC | Self::TC | Self::TBL | Self::TBR | Self::TBC
        )
    }
}

impl Display for ChannelRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ChannelRole {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.short_name() == upper)
            .ok_or_else(|| LayoutError::UnknownRole(s.to_string()).into())
    }
}

/// Standard speaker layouts and their canonical channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StdLayout {
    /// Mono: FC.
    Layout1_0,
    /// Stereo: FL FR.
    Layout2_0,
    /// FL FR LFE.
    Layout2_1,
    /// FL FR FC.
    Layout3_0,
    /// FL FR FC LFE.
    Layout3_1,
    /// Quad: FL FR BL BR.
    Layout4_0,
    /// FL FR BL BR LFE.
    Layout4_1,
    /// FL FR FC BL BR.
    Layout5_0,
    /// FL FR FC LFE BL BR.
    Layout5_1,
    /// FL FR FC BL BR SL SR.
    Layout7_0,
    /// FL FR FC LFE BL BR SL SR.
    Layout7_1,
}

impl StdLayout {
    /// Every standard layout, smallest first.
    pub const ALL: [StdLayout; 11] = [
        Self::Layout1_0,
        Self::Layout2_0,
        Self::Layout2_1,
        Self::Layout3_0,
        Self::Layout3_1,
        Self::Layout4_0,
        Self::Layout4_1,
        Self::Layout5_0,
        Self::Layout5_1,
        Self::Layout7_0,
        Self::Layout7_1,
    ];

    /// Roles of this layout in interleave order.
    pub const fn roles(self) -> &'static [ChannelRole] {
        use ChannelRole::*;
        match self {
            Self::Layout1_0 => &[FC],
            Self::Layout2_0 => &[FL, FR],
            Self::Layout2_1 => &[FL, FR, LFE],
            Self::Layout3_0 => &[FL, FR, FC],
            Self::Layout3_1 => &[FL, FR, FC, LFE],
            Self::Layout4_0 => &[FL, FR, BL, BR],
            Self::Layout4_1 => &[FL, FR, BL, BR, LFE],
            Self::Layout5_0 => &[FL, FR, FC, BL, BR],
            Self::Layout5_1 => &[FL, FR, FC, LFE, BL, BR],
            Self::Layout7_0 => &[FL, FR, FC, BL, BR, SL, SR],
            Self::Layout7_1 => &[FL, FR, FC, LFE, BL, BR, SL, SR],
        }
    }

    /// Number of channels.
    pub const fn channel_count(self) -> usize {
        self.roles().len()
    }

    /// Conventional name, e.g. `"5.1"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Layout1_0 => "1.0",
            Self::Layout2_0 => "2.0",
            Self::Layout2_1 => "2.1",
            Self::Layout3_0 => "3.0",
            Self::Layout3_1 => "3.1",
            Self::Layout4_0 => "4.0",
            Self::Layout4_1 => "4.1",
            Self::Layout5_0 => "5.0",
            Self::Layout5_1 => "5.1",
            Self::Layout7_0 => "7.0",
            Self::Layout7_1 => "7.1",
        }
    }

    /// The usual layout for a bare channel count (as reported by devices
    /// that do not describe speaker positions).
    pub const fn for_channel_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Layout1_0),
            2 => Some(Self::Layout2_0),
            3 => Some(Self::Layout2_1),
            4 => Some(Self::Layout4_0),
            5 => Some(Self::Layout4_1),
            6 => Some(Self::Layout5_1),
            7 => Some(Self::Layout7_0),
            8 => Some(Self::Layout7_1),
            _ => None,
        }
    }

    /// The smallest standard layout holding every role of `layout`.
    pub fn smallest_containing(layout: &ChannelLayout) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|std| layout.iter().all(|role| std.roles().contains(&role)))
    }
}

impl Display for StdLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered, duplicate-free list of channel roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChannelRole>", into = "Vec<ChannelRole>")]
pub struct ChannelLayout {
    roles: Vec<ChannelRole>,
}

impl ChannelLayout {
    /// Builds a layout from roles in interleave order.
    ///
    /// # Errors
    /// Returns [`LayoutError::DuplicateRole`] if a role appears twice.
    pub fn new(roles: impl IntoIterator<Item = ChannelRole>) -> PcmResult<Self> {
        let mut seen = [false; ChannelRole::COUNT];
        let mut out = Vec::new();
        for role in roles {
            if seen[role.index()] {
                return Err(LayoutError::DuplicateRole(role).into());
            }
            seen[role.index()] = true;
            out.push(role);
        }
        Ok(Self { roles: out })
    }

    /// An empty layout.
    pub const fn empty() -> Self {
        Self { roles: Vec::new() }
    }

    /// Number of channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if the layout has no channels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Role at interleave position `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<ChannelRole> {
        self.roles.get(index).copied()
    }

    /// Roles in interleave order.
    #[inline]
    pub fn roles(&self) -> &[ChannelRole] {
        &self.roles
    }

    /// Iterates the roles in interleave order.
    pub fn iter(&self) -> impl Iterator<Item = ChannelRole> + '_ {
        self.roles.iter().copied()
    }

    /// Interleave position of `role`, if present.
    pub fn index_of(&self, role: ChannelRole) -> Option<usize> {
        self.roles.iter().position(|&r| r == role)
    }

    /// Returns true if `role` is part of the layout.
    pub fn has_role(&self, role: ChannelRole) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if every role of `other` is part of this layout.
    pub fn contains_all(&self, other: &ChannelLayout) -> bool {
        other.iter().all(|role| self.has_role(role))
    }

    /// Number of roles of this layout that are also in `other`.
    pub fn count_in(&self, other: &ChannelLayout) -> usize {
        self.iter().filter(|&role| other.has_role(role)).count()
    }

    /// Keeps only the roles that are also present in `other`, preserving
    /// this layout's order.
    pub fn retain_in(&mut self, other: &ChannelLayout) {
        self.roles.retain(|&role| other.has_role(role));
    }

    /// Appends `role` if it is not already present.
    pub fn push(&mut self, role: ChannelRole) {
        if !self.has_role(role) {
            self.roles.push(role);
        }
    }
}

impl From<StdLayout> for ChannelLayout {
    fn from(layout: StdLayout) -> Self {
        Self {
            roles: layout.roles().to_vec(),
        }
    }
}

impl TryFrom<Vec<ChannelRole>> for ChannelLayout {
    type Error = PcmError;

    fn try_from(roles: Vec<ChannelRole>) -> Result<Self, Self::Error> {
        Self::new(roles)
    }
}

impl From<ChannelLayout> for Vec<ChannelRole> {
    fn from(layout: ChannelLayout) -> Self {
        layout.roles
    }
}

impl Display for ChannelLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, role) in self.roles.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            Display::fmt(role, f)?;
        }
        Ok(())
    }
}

impl FromStr for ChannelLayout {
    type Err = PcmError;

    /// Parses a comma separated list of short role names, e.g. `"FL,FR"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        let roles = s
            .split(',')
            .map(str::parse::<ChannelRole>)
            .collect::<PcmResult<Vec<_>>>()?;
        Self::new(roles)
    }
}

impl<'a> IntoIterator for &'a ChannelLayout {
    type Item = ChannelRole;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ChannelRole>>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.iter().copied()
    }
}
