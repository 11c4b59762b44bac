//! Mix matrix construction and application.

use std::fmt::{Display, Formatter};

use tracing::trace;

use super::RemapOptions;
use super::rules::{CENTER_SUBSTITUTES, DOWNMIX_RULES, DownmixRule, UPMIX_CLONES};
use crate::channels::{ChannelLayout, ChannelRole};
use crate::config::RemapConfig;
use crate::error::ensure_len;
use crate::{LayoutError, PcmResult};

/// One source channel feeding a role at a linear gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixContribution {
    /// Index of the source channel in the input layout.
    pub source: usize,
    /// Linear gain applied to the source sample.
    pub gain: f32,
}

/// Resolution state of a role while the matrix is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    /// The role carries no signal.
    #[default]
    NotPresent,
    /// The role carries signal that has not yet reached the destination.
    Unresolved,
    /// The role's signal has been redistributed to other roles.
    Resolved,
}

/// Contributions and state for one channel role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixEntry {
    contributions: Vec<MixContribution>,
    state: SourceState,
    in_destination: bool,
}

impl MixEntry {
    /// Source channels feeding this role.
    pub fn contributions(&self) -> &[MixContribution] {
        &self.contributions
    }

    /// Resolution state.
    pub const fn state(&self) -> SourceState {
        self.state
    }

    /// Whether the output layout carries this role.
    pub const fn in_destination(&self) -> bool {
        self.in_destination
    }

    /// Sum of linear gains over all contributions.
    pub fn gain_sum(&self) -> f32 {
        self.contributions.iter().map(|c| c.gain).sum()
    }

    /// Adds `gain` from `source`, merging with an existing contribution from
    /// the same source by power sum.
    fn add(&mut self, source: usize, gain: f32) {
        match self.contributions.iter_mut().find(|c| c.source == source) {
            Some(existing) => existing.gain = (existing.gain * existing.gain + gain * gain).sqrt(),
            None => self.contributions.push(MixContribution { source, gain }),
        }
    }
}

/// How one output channel is produced from an input frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Always zero.
    Silent,
    /// Copies one input channel at unity gain.
    Copy(usize),
    /// Weighted sum of input channels.
    Mix(Vec<MixContribution>),
}

/// Linear mapping from one channel layout to another.
///
/// Entries are indexed by [`ChannelRole`]; routes are indexed by output
/// channel position and are what [`apply`](Self::apply) walks.
#[derive(Debug, Clone, PartialEq)]
pub struct MixMatrix {
    input: ChannelLayout,
    output: ChannelLayout,
    entries: Vec<MixEntry>,
    routes: Vec<Route>,
}

impl MixMatrix {
    /// Builds the matrix mapping `input` to `output`.
    pub(crate) fn build(
        input: &ChannelLayout,
        output: &ChannelLayout,
        options: &RemapOptions,
        config: &RemapConfig,
    ) -> PcmResult<Self> {
        if input.is_empty() {
            return Err(LayoutError::EmptyLayout { side: "input" }.into());
        }
        if output.is_empty() {
            return Err(LayoutError::EmptyLayout { side: "output" }.into());
        }
        config.validate()?;

        let mut builder = Builder::new(output, options.layout_hint.as_ref());
        if options.final_stage {
            builder.map_direct(input);
        } else {
            builder.seed(input);
            for rule in &DOWNMIX_RULES {
                builder.apply_rule(rule)?;
            }
            builder.resolve_center(input, config.center_mix_gain())?;
            builder.check_complete()?;
            if config.stereo_upmix {
                builder.upmix_stereo(input);
            }
            if options.force_normalize || config.normalize_levels {
                builder.normalize();
            }
        }

        let routes = output
            .iter()
            .map(|role| route_for(&builder.entries[role.index()]))
            .collect();
        Ok(Self {
            input: input.clone(),
            output: output.clone(),
            entries: builder.entries,
            routes,
        })
    }

    /// Layout the matrix reads.
    pub const fn input(&self) -> &ChannelLayout {
        &self.input
    }

    /// Layout the matrix writes.
    pub const fn output(&self) -> &ChannelLayout {
        &self.output
    }

    /// Entry for `role`.
    pub fn entry(&self, role: ChannelRole) -> &MixEntry {
        &self.entries[role.index()]
    }

    /// Gain from input channel `source` into `output_role`, zero when the
    /// source does not feed it.
    pub fn gain(&self, output_role: ChannelRole, source: usize) -> f32 {
        self.entry(output_role)
            .contributions
            .iter()
            .find(|c| c.source == source)
            .map_or(0.0, |c| c.gain)
    }

    /// Routes in output channel order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mixes `frames` interleaved input frames into `output`.
    ///
    /// # Errors
    /// Returns [`PcmError::Parameter`](crate::PcmError::Parameter) if either
    /// buffer holds fewer than `frames` frames, or if `frames` is too large
    /// to address.
    pub fn apply(&self, input: &[f32], output: &mut [f32], frames: usize) -> PcmResult<()> {
        let in_channels = self.input.len();
        let out_channels = self.output.len();
        ensure_len("input", input, frames, in_channels)?;
        ensure_len("output", output, frames, out_channels)?;

        let in_frames = input.chunks_exact(in_channels).take(frames);
        let out_frames = output.chunks_exact_mut(out_channels).take(frames);
        for (src, dst) in in_frames.zip(out_frames) {
            for (sample, route) in dst.iter_mut().zip(&self.routes) {
                *sample = match route {
                    Route::Silent => 0.0,
                    Route::Copy(source) => src[*source],
                    Route::Mix(contributions) => contributions
                        .iter()
                        .map(|c| src[c.source] * c.gain)
                        .sum(),
                };
            }
        }
        Ok(())
    }
}

impl Display for MixMatrix {
    /// Gain table, one row per output channel and one column per input
    /// channel.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>6}", "")?;
        for role in &self.input {
            write!(f, " {:>7}", role.short_name())?;
        }
        for role in &self.output {
            write!(f, "\n{:>6}", role.short_name())?;
            for source in 0..self.input.len() {
                write!(f, " {:>7.4}", self.gain(role, source))?;
            }
        }
        Ok(())
    }
}

fn route_for(entry: &MixEntry) -> Route {
    if !entry.in_destination {
        return Route::Silent;
    }
    match entry.contributions.as_slice() {
        [] => Route::Silent,
        [single] if single.gain == 1.0 => Route::Copy(single.source),
        contributions => Route::Mix(contributions.to_vec()),
    }
}

/// Mutable working state while a matrix is resolved.
struct Builder {
    entries: Vec<MixEntry>,
}

impl Builder {
    fn new(output: &ChannelLayout, hint: Option<&ChannelLayout>) -> Self {
        let mut entries = vec![MixEntry::default(); ChannelRole::COUNT];
        for role in output {
            entries[role.index()].in_destination = hint.is_none_or(|hint| hint.has_role(role));
        }
        Self { entries }
    }

    fn entry(&mut self, role: ChannelRole) -> &mut MixEntry {
        &mut self.entries[role.index()]
    }

    fn in_destination(&self, role: ChannelRole) -> bool {
        self.entries[role.index()].in_destination
    }

    /// One-to-one mapping; input roles the destination lacks are dropped.
    fn map_direct(&mut self, input: &ChannelLayout) {
        for (source, role) in input.iter().enumerate() {
            let entry = self.entry(role);
            if entry.in_destination {
                entry.add(source, 1.0);
                entry.state = SourceState::Unresolved;
            }
        }
    }

    /// Every input role starts as its own unity contribution.
    fn seed(&mut self, input: &ChannelLayout) {
        for (source, role) in input.iter().enumerate() {
            let entry = self.entry(role);
            entry.add(source, 1.0);
            entry.state = SourceState::Unresolved;
        }
    }

    fn apply_rule(&mut self, rule: &DownmixRule) -> PcmResult<()> {
        if rule.guarded && !rule.targets.iter().all(|&target| self.in_destination(target)) {
            return Ok(());
        }
        self.resolve(rule.source, rule.targets, 1.0)
    }

    /// Redistributes `source` evenly by power over `targets`, scaled by
    /// `level`.
    fn resolve(&mut self, source: ChannelRole, targets: &[ChannelRole], level: f32) -> PcmResult<()> {
        let entry = &self.entries[source.index()];
        if entry.in_destination || entry.state != SourceState::Unresolved {
            return Ok(());
        }

        let share = level / (targets.len() as f32).sqrt();
        let moved = std::mem::take(&mut self.entry(source).contributions);
        for &target in targets {
            let target_entry = self.entry(target);
            match target_entry.state {
                SourceState::NotPresent => target_entry.state = SourceState::Unresolved,
                SourceState::Resolved if !target_entry.in_destination => {
                    return Err(LayoutError::Unroutable(source).into());
                }
                _ => {}
            }
            for contribution in &moved {
                target_entry.add(contribution.source, contribution.gain * share);
            }
        }
        self.entry(source).state = SourceState::Resolved;
        trace!("resolved {} into {:?}", source, targets);
        Ok(())
    }

    fn resolve_center(&mut self, input: &ChannelLayout, level: f32) -> PcmResult<()> {
        let center = &self.entries[ChannelRole::FC.index()];
        if center.in_destination {
            let dual_mono = input.roles() == [ChannelRole::FC]
                && self.in_destination(ChannelRole::FL)
                && self.in_destination(ChannelRole::FR);
            if dual_mono {
                for role in [ChannelRole::FL, ChannelRole::FR] {
                    self.entry(role).add(0, 1.0);
                }
                trace!("duplicated mono centre into FL and FR");
            }
            return Ok(());
        }
        if center.state != SourceState::Unresolved {
            return Ok(());
        }

        let substitutes = CENTER_SUBSTITUTES
            .iter()
            .find(|roles| roles.iter().all(|&role| self.in_destination(role)))
            .ok_or(LayoutError::NoCenterPath)?;
        self.resolve(ChannelRole::FC, substitutes, level)
    }

    fn check_complete(&self) -> PcmResult<()> {
        for role in ChannelRole::ALL {
            let entry = &self.entries[role.index()];
            if entry.state == SourceState::Unresolved && !entry.in_destination {
                return Err(LayoutError::Unroutable(role).into());
            }
        }
        Ok(())
    }

    /// Clones the stereo fronts into destination roles the input lacks.
    ///
    /// Clones take the origin's input channel directly, so they are fed even
    /// when the cascade folded the origin elsewhere. Every destination that
    /// channel reaches is then scaled by `1/sqrt(clones + 1)`.
    fn upmix_stereo(&mut self, input: &ChannelLayout) {
        if input.len() != 2 {
            return;
        }
        let (Some(left), Some(right)) = (input.index_of(ChannelRole::FL), input.index_of(ChannelRole::FR)) else {
            return;
        };

        for (origin, source) in [(ChannelRole::FL, left), (ChannelRole::FR, right)] {
            let mut count = 0;
            for (_, clone) in UPMIX_CLONES.iter().filter(|(o, _)| *o == origin) {
                if !self.in_destination(*clone) || input.has_role(*clone) {
                    continue;
                }
                let entry = self.entry(*clone);
                entry.contributions = vec![MixContribution { source, gain: 1.0 }];
                entry.state = SourceState::Unresolved;
                count += 1;
            }
            if count == 0 {
                continue;
            }

            let scale = 1.0 / ((count + 1) as f32).sqrt();
            for entry in &mut self.entries {
                for contribution in entry.contributions.iter_mut().filter(|c| c.source == source) {
                    contribution.gain *= scale;
                }
            }
            trace!("upmixed {} into {} clones", origin, count);
        }
    }

    /// Scales every gain so the loudest destination sums to one.
    fn normalize(&mut self) {
        let max = self
            .entries
            .iter()
            .filter(|entry| entry.in_destination)
            .map(MixEntry::gain_sum)
            .fold(0.0f32, f32::max);
        if max <= 0.0 {
            return;
        }
        let scale = 1.0 / max;
        for entry in &mut self.entries {
            for contribution in &mut entry.contributions {
                contribution.gain *= scale;
            }
        }
    }
}
