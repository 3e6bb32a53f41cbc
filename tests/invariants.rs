//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees of the action
//! pipeline: determinism, value semantics, sequential composition, and
//! the error taxonomy at the dispatch boundary.

use image::{Rgb, RgbImage};
use serde_json::json;

use pixelpipe_core::{
    codec::{self, OutputFormat},
    pipeline, validation, Action, PixelBuffer, PipelineError, Registry,
};

fn gradient_rgb(width: u32, height: u32) -> PixelBuffer {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 % 256) as u8,
            (y * 13 % 256) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    PixelBuffer::Rgb(img)
}

fn png_wire(buffer: &PixelBuffer) -> String {
    codec::encode(buffer, OutputFormat::Png, 100).expect("png encode")
}

fn action(name: &str, arguments: serde_json::Value) -> Action {
    let map = arguments
        .as_object()
        .cloned()
        .expect("test arguments are an object");
    Action::new(name, map)
}

#[test]
fn invariant_repeat_invocation_is_deterministic() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(24, 18);
    let actions = vec![
        action("gray", json!({})),
        action("dx", json!({"kernel_size": 5, "degree": 1})),
        action("binary", json!({"first_threshold": 60, "second_threshold": 255})),
    ];

    let first = pipeline::apply(&registry, &buffer, &actions).unwrap();
    let second = pipeline::apply(&registry, &buffer, &actions).unwrap();

    // Byte-identical output for identical input.
    assert_eq!(first.samples(), second.samples());
}

#[test]
fn invariant_empty_action_list_is_identity() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(10, 10);

    let result = pipeline::apply(&registry, &buffer, &[]).unwrap();

    assert_eq!(result, buffer);
    // The executor works on a private copy, never the caller's buffer.
    assert!(!std::ptr::eq(result.samples(), buffer.samples()));
}

#[test]
fn invariant_sequential_composition() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(20, 14);
    let a1 = action("gray", json!({}));
    let a2 = action("resize", json!({"width": 8, "height": 6}));

    let combined = pipeline::apply(&registry, &buffer, &[a1.clone(), a2.clone()]).unwrap();
    let step_one = pipeline::apply(&registry, &buffer, &[a1]).unwrap();
    let step_two = pipeline::apply(&registry, &step_one, &[a2]).unwrap();

    assert_eq!(combined, step_two);
}

#[test]
fn invariant_validator_verdicts() {
    assert!(!validation::actions_valid(&json!("not a sequence")));
    assert!(!validation::actions_valid(&json!([{"arguments": {}}])));
    assert!(validation::actions_valid(
        &json!([{"name": "gray", "arguments": {}}])
    ));
}

#[test]
fn invariant_round_trip_preserves_dimensions() {
    let buffer = gradient_rgb(33, 21);
    let wire = png_wire(&buffer);
    let decoded = codec::decode(&wire).unwrap();

    assert_eq!(decoded.width(), 33);
    assert_eq!(decoded.height(), 21);
}

#[test]
fn invariant_decode_accepts_bare_payload() {
    let wire = png_wire(&gradient_rgb(5, 5));
    let payload = wire
        .split_once(";base64,")
        .map(|(_, p)| p)
        .expect("encoded wire carries a header");

    let decoded = codec::decode(payload).unwrap();
    assert_eq!(decoded.width(), 5);
    assert_eq!(decoded.height(), 5);
}

#[test]
fn invariant_gray_reduces_to_one_channel() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(16, 12);

    let result = pipeline::apply(&registry, &buffer, &[action("gray", json!({}))]).unwrap();

    assert_eq!(result.channels(), 1);
    assert_eq!(result.width(), 16);
    assert_eq!(result.height(), 12);
}

#[test]
fn invariant_resize_sets_dimensions_keeps_channels() {
    let registry = Registry::built_in();
    let color = gradient_rgb(20, 20);
    let resize = action("resize", json!({"width": 32, "height": 16}));

    let resized = pipeline::apply(&registry, &color, std::slice::from_ref(&resize)).unwrap();
    assert_eq!((resized.width(), resized.height()), (32, 16));
    assert_eq!(resized.channels(), 3);

    let gray = pipeline::apply(&registry, &color, &[action("gray", json!({}))]).unwrap();
    let resized_gray = pipeline::apply(&registry, &gray, &[resize]).unwrap();
    assert_eq!((resized_gray.width(), resized_gray.height()), (32, 16));
    assert_eq!(resized_gray.channels(), 1);
}

#[test]
fn invariant_binary_output_is_two_valued() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(15, 15);
    let actions = vec![action(
        "binary",
        json!({"first_threshold": 127, "second_threshold": 255}),
    )];

    let result = pipeline::apply(&registry, &buffer, &actions).unwrap();
    assert!(result.samples().iter().all(|&s| s == 0 || s == 255));
}

#[test]
fn invariant_binary_inverted_flips_polarity() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(15, 15);
    let plain = pipeline::apply(
        &registry,
        &buffer,
        &[action("binary", json!({"first_threshold": 100, "second_threshold": 200}))],
    )
    .unwrap();
    let inverted = pipeline::apply(
        &registry,
        &buffer,
        &[action(
            "binary_inverted",
            json!({"first_threshold": 100, "second_threshold": 200}),
        )],
    )
    .unwrap();

    for (&a, &b) in plain.samples().iter().zip(inverted.samples()) {
        assert!((a == 200) ^ (b == 200));
        assert!(a == 0 || a == 200);
        assert!(b == 0 || b == 200);
    }
}

#[test]
fn invariant_canny_output_is_a_binary_edge_map() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(32, 32);
    let actions = vec![action(
        "canny_edges",
        json!({"first_threshold": 50, "second_threshold": 100}),
    )];

    let result = pipeline::apply(&registry, &buffer, &actions).unwrap();
    assert_eq!(result.channels(), 1);
    assert!(result.samples().iter().all(|&s| s == 0 || s == 255));
}

#[test]
fn invariant_unknown_action_is_rejected() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(8, 8);

    let err = pipeline::apply(&registry, &buffer, &[action("nonexistent", json!({}))])
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownAction(name) if name == "nonexistent"));
}

#[test]
fn invariant_argument_mismatch_is_rejected() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(8, 8);

    // Missing required field.
    let err = pipeline::apply(&registry, &buffer, &[action("resize", json!({"width": 10}))])
        .unwrap_err();
    assert!(matches!(err, PipelineError::Argument { .. }));

    // Wrong type.
    let err = pipeline::apply(
        &registry,
        &buffer,
        &[action("resize", json!({"width": "ten", "height": 10}))],
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Argument { .. }));

    // Out-of-range aperture.
    let err = pipeline::apply(
        &registry,
        &buffer,
        &[action("dx", json!({"kernel_size": 4}))],
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Argument { .. }));
}

#[test]
fn invariant_failure_leaves_no_partial_result() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(8, 8);
    let actions = vec![
        action("gray", json!({})),
        action("nonexistent", json!({})),
    ];

    assert!(pipeline::apply(&registry, &buffer, &actions).is_err());
    // The caller's buffer is untouched by the aborted run.
    assert_eq!(buffer, gradient_rgb(8, 8));
}

#[test]
fn invariant_encode_always_expands_to_color() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(12, 12);

    let gray = pipeline::apply(&registry, &buffer, &[action("gray", json!({}))]).unwrap();
    assert_eq!(gray.channels(), 1);

    // The wire form re-expands to 3 channels even after a grayscale step.
    let wire = png_wire(&gray);
    let decoded = codec::decode(&wire).unwrap();
    assert_eq!(decoded.channels(), 3);
    assert_eq!((decoded.width(), decoded.height()), (12, 12));
}

#[test]
fn invariant_process_runs_full_chain() {
    let registry = Registry::built_in();
    let wire = png_wire(&gradient_rgb(40, 30));
    let actions = json!([
        {"name": "gray", "arguments": {}},
        {"name": "resize", "arguments": {"width": 20, "height": 15}}
    ]);

    let out = pipeline::process(&registry, &wire, &actions).unwrap();
    assert!(out.starts_with("data:image/png;base64,"));

    let decoded = codec::decode(&out).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 15));
}

#[test]
fn invariant_process_rejects_structural_defects() {
    let registry = Registry::built_in();
    let wire = png_wire(&gradient_rgb(6, 6));

    let err = pipeline::process(&registry, &wire, &json!({"name": "gray"})).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));

    let err = pipeline::process(&registry, "@@@", &json!([])).unwrap_err();
    assert!(matches!(err, PipelineError::Decode(_)));
}

#[test]
fn invariant_jpeg_output_round_trips() {
    let buffer = gradient_rgb(25, 17);
    let wire = codec::encode(&buffer, OutputFormat::Jpeg, 90).unwrap();

    assert!(wire.starts_with("data:image/jpeg;base64,"));
    let decoded = codec::decode(&wire).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (25, 17));
}

#[test]
fn invariant_concurrent_apply_does_not_interfere() {
    let registry = Registry::built_in();
    let buffer = gradient_rgb(30, 30);

    let per_thread: Vec<Vec<Action>> = vec![
        vec![action("gray", json!({}))],
        vec![action("resize", json!({"width": 10, "height": 10}))],
        vec![action("dy", json!({}))],
        vec![action("binary", json!({"first_threshold": 90, "second_threshold": 255}))],
    ];
    let expected: Vec<PixelBuffer> = per_thread
        .iter()
        .map(|actions| pipeline::apply(&registry, &buffer, actions).unwrap())
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = per_thread
            .iter()
            .map(|actions| {
                let registry = &registry;
                let buffer = &buffer;
                scope.spawn(move || pipeline::apply(registry, buffer, actions).unwrap())
            })
            .collect();

        for (handle, expected) in handles.into_iter().zip(&expected) {
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });

    // The shared input buffer is unchanged after all threads finish.
    assert_eq!(buffer, gradient_rgb(30, 30));
}
