use approx_eq::assert_approx_eq;
use proptest::prelude::*;

use super::*;
use crate::channels::ChannelRole::{self, *};
use crate::channels::StdLayout;
use crate::{PcmError, ParameterError};

const EPSILON: f32 = 1e-5;

fn layout(roles: &[ChannelRole]) -> ChannelLayout {
    ChannelLayout::new(roles.iter().copied()).unwrap()
}

fn raw_gains() -> RemapConfig {
    RemapConfig {
        normalize_levels: false,
        ..RemapConfig::default()
    }
}

fn upmix_raw_gains() -> RemapConfig {
    RemapConfig {
        stereo_upmix: true,
        ..raw_gains()
    }
}

fn build(
    config: RemapConfig,
    input: &ChannelLayout,
    output: &ChannelLayout,
    options: &RemapOptions,
) -> Remapper {
    let mut remapper = Remapper::new(config);
    remapper.initialize(input, output, options).unwrap();
    remapper
}

fn matrix(remapper: &Remapper) -> &MixMatrix {
    remapper.matrix().unwrap()
}

fn assert_conserves(matrix: &MixMatrix) {
    for role in matrix.output() {
        let sum = matrix.entry(role).gain_sum();
        assert!(sum <= 1.0 + EPSILON, "{role} sums to {sum}\n{matrix}");
    }
}

fn assert_complete(matrix: &MixMatrix) {
    for (source, role) in matrix.input().iter().enumerate() {
        let fed = matrix
            .output()
            .iter()
            .any(|out| matrix.gain(out, source) > 0.0);
        assert!(fed, "input {role} feeds nothing\n{matrix}");
    }
}

#[test]
fn final_stage_is_identity() {
    for std in StdLayout::ALL {
        let layout = ChannelLayout::from(std);
        let remapper = build(
            RemapConfig::default(),
            &layout,
            &layout,
            &RemapOptions::default().with_final_stage(true),
        );
        assert!(
            matrix(&remapper)
                .routes()
                .iter()
                .enumerate()
                .all(|(i, route)| *route == Route::Copy(i))
        );

        let frames = 5;
        let input: Vec<f32> = (0..frames * layout.len())
            .map(|i| (i as f32 * 0.37).sin())
            .collect();
        let mut output = vec![0.0f32; input.len()];
        remapper.apply(&input, &mut output, frames).unwrap();
        assert_eq!(output, input, "{std}");
    }
}

#[test]
fn final_stage_drops_missing_roles() {
    let remapper = build(
        RemapConfig::default(),
        &StdLayout::Layout5_1.into(),
        &layout(&[FR, FL]),
        &RemapOptions::default().with_final_stage(true),
    );
    assert_eq!(matrix(&remapper).routes(), &[Route::Copy(1), Route::Copy(0)]);
    assert!(matrix(&remapper).entry(FC).contributions().is_empty());
}

#[test]
fn surround_to_stereo() {
    let input = ChannelLayout::from(StdLayout::Layout5_1);
    let remapper = build(
        RemapConfig::default(),
        &input,
        &StdLayout::Layout2_0.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    let fc = input.index_of(FC).unwrap();
    let lfe = input.index_of(LFE).unwrap();
    let bl = input.index_of(BL).unwrap();
    let br = input.index_of(BR).unwrap();

    assert!(m.gain(FL, fc) > 0.0);
    assert_eq!(m.gain(FL, fc), m.gain(FR, fc));
    assert!(m.gain(FL, lfe) > 0.0);
    assert_eq!(m.gain(FL, lfe), m.gain(FR, lfe));
    assert!(m.gain(FL, bl) > 0.0);
    assert_eq!(m.gain(FR, bl), 0.0);
    assert!(m.gain(FR, br) > 0.0);
    assert_eq!(m.gain(FL, br), 0.0);
    assert_conserves(m);

    // FL collects FL, BL, and half the power of FC and LFE
    let fl_sum = 1.0 + 1.0 + 2.0 * std::f64::consts::FRAC_1_SQRT_2;
    assert_approx_eq!(m.gain(FL, 0) as f64, 1.0 / fl_sum, 1e-5);
    assert_approx_eq!(m.gain(FL, fc) as f64, std::f64::consts::FRAC_1_SQRT_2 / fl_sum, 1e-5);

    let frames = 64;
    let mut block = vec![0.0f32; frames * 6];
    for frame in block.chunks_exact_mut(6) {
        frame[fc] = 1.0;
    }
    let mut out = vec![0.0f32; frames * 2];
    remapper.apply(&block, &mut out, frames).unwrap();
    for frame in out.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
        assert!(frame[0] > 0.0 && frame[0] <= 1.0);
    }
}

#[test]
fn every_std_pair_conserves_and_completes() {
    for from in StdLayout::ALL {
        for to in StdLayout::ALL {
            let remapper = build(
                RemapConfig::default(),
                &from.into(),
                &to.into(),
                &RemapOptions::default(),
            );
            assert_conserves(matrix(&remapper));
            assert_complete(matrix(&remapper));
        }
    }
}

#[test]
fn side_channels_fold_into_backs() {
    let input = ChannelLayout::from(StdLayout::Layout7_1);
    let remapper = build(
        raw_gains(),
        &input,
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    let sl = input.index_of(SL).unwrap();
    let sr = input.index_of(SR).unwrap();
    assert_eq!(m.gain(BL, sl), 1.0);
    assert_eq!(m.gain(BR, sr), 1.0);
    assert_eq!(m.gain(FL, sl), 0.0);
    assert_eq!(m.entry(SL).state(), SourceState::Resolved);
}

#[test]
fn backs_fold_into_sides() {
    let input = ChannelLayout::from(StdLayout::Layout5_1);
    let output = layout(&[FL, FR, FC, LFE, SL, SR]);
    let remapper = build(raw_gains(), &input, &output, &RemapOptions::default());
    let m = matrix(&remapper);
    assert_eq!(m.gain(SL, input.index_of(BL).unwrap()), 1.0);
    assert_eq!(m.gain(SR, input.index_of(BR).unwrap()), 1.0);
}

#[test]
fn surround_to_mono_collapses_into_centre() {
    let input = ChannelLayout::from(StdLayout::Layout7_1);
    let remapper = build(
        RemapConfig::default(),
        &input,
        &StdLayout::Layout1_0.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    assert_complete(m);
    assert_approx_eq!(m.entry(FC).gain_sum() as f64, 1.0, 1e-5);
}

#[test]
fn top_layer_cascades_to_ear_level() {
    let input = layout(&[FL, FR, TFL, TFR, TBC]);
    let remapper = build(
        raw_gains(),
        &input,
        &StdLayout::Layout4_0.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    assert_eq!(m.gain(FL, 2), 1.0);
    assert_eq!(m.gain(FR, 3), 1.0);
    // TBC splits over TBL/TBR, which then land on the backs
    assert_approx_eq!(m.gain(BL, 4) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
    assert_approx_eq!(m.gain(BR, 4) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
}

#[test]
fn same_source_contributions_merge_by_power() {
    // TC reaches FL both via TFL and via TBL -> BL -> FL
    let input = layout(&[TC]);
    let remapper = build(
        raw_gains(),
        &input,
        &StdLayout::Layout2_0.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    assert_eq!(m.entry(FL).contributions().len(), 1);
    assert_approx_eq!(m.gain(FL, 0) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
}

#[test]
fn centre_without_substitute_fails() {
    let mut remapper = Remapper::new(RemapConfig::default());
    let err = remapper
        .initialize(&layout(&[FC]), &layout(&[BL, BR]), &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(err, PcmError::Layout(LayoutError::NoCenterPath)));
    assert!(!remapper.is_initialized());
}

#[test]
fn centre_substitutes_follow_preference_order() {
    let cases: [(&[ChannelRole], &[ChannelRole]); 4] = [
        (&[FL, FR, TFC], &[TFC, FL, FR]),
        (&[FLOC, FROC], &[FLOC, FROC]),
        (&[TFL, TFR], &[TFL, TFR]),
        (&[TC, TFC], &[TFC]),
    ];
    for (output, expected) in cases {
        let remapper = build(
            raw_gains(),
            &layout(&[FC]),
            &layout(output),
            &RemapOptions::default(),
        );
        let m = matrix(&remapper);
        let share = 1.0 / (expected.len() as f64).sqrt();
        for &role in output {
            let gain = m.gain(role, 0) as f64;
            if expected.contains(&role) {
                assert_approx_eq!(gain, share, 1e-5);
            } else {
                assert_eq!(gain, 0.0, "{role} in {output:?}");
            }
        }
    }
}

#[test]
fn mono_centre_duplicates_to_fronts() {
    let remapper = build(
        RemapConfig::default(),
        &layout(&[FC]),
        &StdLayout::Layout3_0.into(),
        &RemapOptions::default(),
    );
    assert_eq!(
        matrix(&remapper).routes(),
        &[Route::Copy(0), Route::Copy(0), Route::Copy(0)]
    );

    // not when other channels are present
    let remapper = build(
        RemapConfig::default(),
        &layout(&[FC, LFE]),
        &layout(&[FL, FR, FC, LFE]),
        &RemapOptions::default(),
    );
    assert_eq!(matrix(&remapper).gain(FL, 0), 0.0);
}

#[test]
fn centre_mix_level_scales_folded_centre() {
    let input = ChannelLayout::from(StdLayout::Layout3_0);
    let fc = input.index_of(FC).unwrap();
    for level_db in [-6.0f32, 0.0, 3.0] {
        let config = RemapConfig {
            center_mix_level_db: level_db,
            ..raw_gains()
        };
        let remapper = build(config, &input, &StdLayout::Layout2_0.into(), &RemapOptions::default());
        let m = matrix(&remapper);
        let expected = std::f64::consts::FRAC_1_SQRT_2 * 10f64.powf(level_db as f64 / 20.0);
        assert_approx_eq!(m.gain(FL, fc) as f64, expected, 1e-5);
        assert_approx_eq!(m.gain(FR, fc) as f64, expected, 1e-5);
        assert_eq!(m.gain(FL, input.index_of(FL).unwrap()), 1.0);
    }
}

#[test]
fn centre_mix_level_leaves_kept_centre_alone() {
    let config = RemapConfig {
        center_mix_level_db: 6.0,
        ..RemapConfig::default()
    };
    let remapper = build(
        config,
        &layout(&[FC]),
        &StdLayout::Layout3_0.into(),
        &RemapOptions::default(),
    );
    assert_eq!(
        matrix(&remapper).routes(),
        &[Route::Copy(0), Route::Copy(0), Route::Copy(0)]
    );
}

#[test]
fn out_of_range_centre_mix_level_is_rejected() {
    let mut remapper = Remapper::new(RemapConfig {
        center_mix_level_db: -60.0,
        ..RemapConfig::default()
    });
    let err = remapper
        .initialize(&StdLayout::Layout5_1.into(), &StdLayout::Layout2_0.into(), &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(err, PcmError::Parameter(ParameterError::InvalidValue { .. })));
    assert!(!remapper.is_initialized());
}

#[test]
fn unreachable_roles_fail() {
    let mut remapper = Remapper::new(RemapConfig::default());
    let err = remapper
        .initialize(&StdLayout::Layout2_0.into(), &layout(&[BL, BR]), &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(err, PcmError::Layout(LayoutError::Unroutable(FL))));

    let err = remapper
        .initialize(&layout(&[FL, FR, Raw]), &StdLayout::Layout2_0.into(), &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(err, PcmError::Layout(LayoutError::Unroutable(Raw))));
}

#[test]
fn stereo_upmix_clones_fronts() {
    let config = upmix_raw_gains();
    let output = ChannelLayout::from(StdLayout::Layout7_1);
    let remapper = build(config, &StdLayout::Layout2_0.into(), &output, &RemapOptions::default());
    let m = matrix(&remapper);
    let third = 1.0 / 3.0f64.sqrt();
    for role in [FL, BL, SL] {
        assert_approx_eq!(m.gain(role, 0) as f64, third, 1e-5);
        assert_eq!(m.gain(role, 1), 0.0);
    }
    for role in [FR, BR, SR] {
        assert_approx_eq!(m.gain(role, 1) as f64, third, 1e-5);
    }
    assert!(m.entry(FC).contributions().is_empty());
    assert!(m.entry(LFE).contributions().is_empty());

    // conserves power per source
    let power: f64 = [FL, BL, SL].iter().map(|&r| (m.gain(r, 0) as f64).powi(2)).sum();
    assert_approx_eq!(power, 1.0, 1e-5);
}

#[test]
fn upmix_only_fills_absent_roles() {
    let config = upmix_raw_gains();
    let remapper = build(
        config,
        &StdLayout::Layout2_0.into(),
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    assert_approx_eq!(m.gain(FL, 0) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
    assert_approx_eq!(m.gain(BL, 0) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);

    // anything other than plain stereo is left alone
    let remapper = build(
        config,
        &StdLayout::Layout3_0.into(),
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default(),
    );
    assert!(matrix(&remapper).entry(BL).contributions().is_empty());
}

#[test]
fn upmix_feeds_surrounds_when_fronts_fold_into_centre() {
    let remapper = build(
        upmix_raw_gains(),
        &StdLayout::Layout2_0.into(),
        &layout(&[FC, BL, BR]),
        &RemapOptions::default(),
    );
    let m = matrix(&remapper);
    let half = std::f64::consts::FRAC_1_SQRT_2;
    assert_approx_eq!(m.gain(FC, 0) as f64, half, 1e-5);
    assert_approx_eq!(m.gain(FC, 1) as f64, half, 1e-5);
    assert_approx_eq!(m.gain(BL, 0) as f64, half, 1e-5);
    assert_approx_eq!(m.gain(BR, 1) as f64, half, 1e-5);
    assert_eq!(m.gain(BL, 1), 0.0);
    assert_eq!(m.gain(BR, 0), 0.0);
    assert!(m.routes().iter().all(|route| *route != Route::Silent));

    let mut out = [0.0f32; 3];
    remapper.apply(&[1.0, 0.0], &mut out, 1).unwrap();
    assert!(out[1] > 0.0);
    assert_eq!(out[2], 0.0);
}

#[test]
fn upmix_honours_layout_hint() {
    let remapper = build(
        upmix_raw_gains(),
        &StdLayout::Layout2_0.into(),
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default().with_layout_hint(StdLayout::Layout2_0),
    );
    let routes = matrix(&remapper).routes();
    assert_eq!(routes[0], Route::Copy(0));
    assert_eq!(routes[1], Route::Copy(1));
    assert!(routes[2..].iter().all(|route| *route == Route::Silent));

    let remapper = build(
        upmix_raw_gains(),
        &StdLayout::Layout2_0.into(),
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default().with_layout_hint(StdLayout::Layout4_0),
    );
    let m = matrix(&remapper);
    assert_approx_eq!(m.gain(BL, 0) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
    assert_approx_eq!(m.gain(BR, 1) as f64, std::f64::consts::FRAC_1_SQRT_2, 1e-5);
    assert_eq!(m.routes()[2], Route::Silent);
}

#[test]
fn raw_input_needs_a_raw_output() {
    let mut remapper = Remapper::new(RemapConfig::default());
    let err = remapper
        .initialize(&layout(&[Raw]), &StdLayout::Layout5_1.into(), &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(err, PcmError::Layout(LayoutError::Unroutable(Raw))));
    assert!(!remapper.is_initialized());

    let remapper = build(
        RemapConfig::default(),
        &layout(&[Raw]),
        &layout(&[FL, FR, Raw]),
        &RemapOptions::default(),
    );
    assert_eq!(
        matrix(&remapper).routes(),
        &[Route::Silent, Route::Silent, Route::Copy(0)]
    );
}

#[test]
fn upmix_is_off_by_default() {
    let remapper = build(
        RemapConfig::default(),
        &StdLayout::Layout2_0.into(),
        &StdLayout::Layout5_1.into(),
        &RemapOptions::default(),
    );
    assert_eq!(matrix(&remapper).routes()[4], Route::Silent);
    assert_eq!(matrix(&remapper).routes()[0], Route::Copy(0));
}

#[test]
fn force_normalize_overrides_config() {
    let input = ChannelLayout::from(StdLayout::Layout5_1);
    let stereo = ChannelLayout::from(StdLayout::Layout2_0);

    let remapper = build(raw_gains(), &input, &stereo, &RemapOptions::default());
    assert!(matrix(&remapper).entry(FL).gain_sum() > 1.0);

    let remapper = build(
        raw_gains(),
        &input,
        &stereo,
        &RemapOptions::default().with_force_normalize(true),
    );
    assert_conserves(matrix(&remapper));
}

#[test]
fn layout_hint_silences_omitted_outputs() {
    let input = ChannelLayout::from(StdLayout::Layout7_1);
    let remapper = build(
        RemapConfig::default(),
        &input,
        &StdLayout::Layout7_1.into(),
        &RemapOptions::default().with_layout_hint(StdLayout::Layout5_1),
    );
    let m = matrix(&remapper);
    assert_eq!(m.routes()[6], Route::Silent);
    assert_eq!(m.routes()[7], Route::Silent);
    assert!(m.gain(BL, input.index_of(SL).unwrap()) > 0.0);
    assert_complete(m);
    assert_conserves(m);
}

#[test]
fn failed_initialize_keeps_previous_matrix() {
    let mut remapper = Remapper::new(RemapConfig::default());
    remapper
        .initialize(&StdLayout::Layout5_1.into(), &StdLayout::Layout2_0.into(), &RemapOptions::default())
        .unwrap();
    let before = matrix(&remapper).clone();

    assert!(
        remapper
            .initialize(&layout(&[FC]), &layout(&[BL]), &RemapOptions::default())
            .is_err()
    );
    assert_eq!(matrix(&remapper), &before);

    let mut out = [0.0f32; 2];
    remapper.apply(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0], &mut out, 1).unwrap();
    assert!(out[0] > 0.0);
}

#[test]
fn empty_layouts_are_rejected() {
    let mut remapper = Remapper::default();
    let stereo = ChannelLayout::from(StdLayout::Layout2_0);
    let err = remapper
        .initialize(&ChannelLayout::empty(), &stereo, &RemapOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        PcmError::Layout(LayoutError::EmptyLayout { side: "input" })
    ));
    let err = remapper
        .initialize(&stereo, &ChannelLayout::empty(), &RemapOptions::default().with_final_stage(true))
        .unwrap_err();
    assert!(matches!(
        err,
        PcmError::Layout(LayoutError::EmptyLayout { side: "output" })
    ));
}

#[test]
fn apply_requires_initialize() {
    let remapper = Remapper::default();
    let mut out = [0.0f32; 2];
    let err = remapper.apply(&[0.0; 2], &mut out, 1).unwrap_err();
    assert!(matches!(err, PcmError::Layout(LayoutError::NotInitialized)));
}

#[test]
fn apply_checks_buffer_sizes() {
    let remapper = build(
        RemapConfig::default(),
        &StdLayout::Layout5_1.into(),
        &StdLayout::Layout2_0.into(),
        &RemapOptions::default(),
    );
    let mut out = [0.0f32; 4];
    let err = remapper.apply(&[0.0; 6], &mut out, 2).unwrap_err();
    assert!(matches!(
        err,
        PcmError::Parameter(ParameterError::BufferTooSmall { buffer: "input", .. })
    ));
}

#[test]
fn apply_rejects_overflowing_frame_counts() {
    let remapper = build(
        RemapConfig::default(),
        &StdLayout::Layout2_0.into(),
        &StdLayout::Layout2_0.into(),
        &RemapOptions::default(),
    );
    let mut out = [0.0f32; 4];
    let err = remapper.apply(&[0.0; 4], &mut out, usize::MAX).unwrap_err();
    assert!(matches!(
        err,
        PcmError::Parameter(ParameterError::InvalidValue { ref parameter, .. }) if parameter == "input"
    ));
    assert_eq!(out, [0.0; 4]);
}

#[test]
fn gain_table_lists_every_channel() {
    let remapper = build(
        RemapConfig::default(),
        &StdLayout::Layout5_1.into(),
        &StdLayout::Layout2_0.into(),
        &RemapOptions::default(),
    );
    let table = matrix(&remapper).to_string();
    assert_eq!(table.lines().count(), 3);
    for name in ["FL", "FR", "FC", "LFE", "BL", "BR"] {
        assert!(table.lines().next().unwrap().contains(name));
    }
}

const ROUTABLE: [ChannelRole; 20] = [
    FL, FR, FC, LFE, BL, BR, FLOC, FROC, BC, SL, SR, TFL, TFR, TFC, TC, TBL, TBR, TBC, BLOC, BROC,
];

fn any_layout() -> impl Strategy<Value = ChannelLayout> {
    proptest::sample::subsequence(ROUTABLE.to_vec(), 1..=ROUTABLE.len())
        .prop_shuffle()
        .prop_map(|roles| ChannelLayout::new(roles).unwrap())
}

proptest! {
    #[test]
    fn any_layout_downmixes_to_std_layouts(
        input in any_layout(),
        output in proptest::sample::select(StdLayout::ALL.to_vec()),
    ) {
        let remapper = build(RemapConfig::default(), &input, &output.into(), &RemapOptions::default());
        assert_conserves(matrix(&remapper));
        assert_complete(matrix(&remapper));
    }

    #[test]
    fn final_stage_reproduces_any_layout(
        layout in any_layout(),
        samples in proptest::collection::vec(-1.0f32..=1.0, 20 * 3),
    ) {
        let remapper = build(
            RemapConfig::default(),
            &layout,
            &layout,
            &RemapOptions::default().with_final_stage(true),
        );
        let frames = samples.len() / layout.len();
        let input = &samples[..frames * layout.len()];
        let mut output = vec![0.0f32; input.len()];
        remapper.apply(input, &mut output, frames).unwrap();
        prop_assert_eq!(&output[..], input);
    }
}
