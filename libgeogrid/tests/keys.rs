use libgeogrid::key::{ColorKey, ColorSpace, MappedKey, MultiScaleKey, Scale, ScaledKey};
use libgeogrid::{Color, KeyError};

const BLACK: Color = Color::rgb(0, 0, 0);
const WHITE: Color = Color::rgb(255, 255, 255);
const RED: Color = Color::rgb(255, 0, 0);
const YELLOW: Color = Color::rgb(255, 255, 0);

fn grey(min: f64, max: f64) -> ScaledKey<f64> {
    ScaledKey::builder()
        .min(min)
        .max(max)
        .min_color(BLACK)
        .max_color(WHITE)
        .tolerance(0.01)
        .build()
        .unwrap()
}

#[test]
fn decode_inverts_encode_within_tolerance() {
    let key = grey(-10.0, 10.0);
    for i in 0..=40 {
        let v = -10.0 + f64::from(i) * 0.5;
        let color = key.color_of(&v).unwrap();
        let back = key.entry_of(color).unwrap();
        // one 8-bit channel step spans 20/255 of the range
        assert!((back - v).abs() <= 20.0 / 255.0, "{v} came back as {back}");
    }
}

#[test]
fn integer_scales_round_trip_exactly() {
    let key = ScaledKey::<i32>::builder()
        .min(0)
        .max(255)
        .min_color(BLACK)
        .max_color(WHITE)
        .build()
        .unwrap();
    for v in 0..=255 {
        assert_eq!(key.entry_of(key.color_of(&v).unwrap()).unwrap(), v);
    }
}

#[test]
fn log_scales_round_trip_across_decades() {
    let key = ScaledKey::<f64>::builder()
        .min(0.001)
        .max(1000.0)
        .min_color(BLACK)
        .max_color(WHITE)
        .scale(Scale::Log)
        .tolerance(0.01)
        .build()
        .unwrap();
    for v in [0.001, 0.01, 0.1, 1.0, 10.0, 100.0, 1000.0] {
        let back = key.entry_of(key.color_of(&v).unwrap()).unwrap();
        // relative error: a channel step spans six decades over 255 steps
        assert!((back.ln() - v.ln()).abs() < 0.1, "{v} came back as {back}");
    }
}

#[test]
fn values_outside_the_range_expose_a_reason() {
    let key = grey(0.0, 10.0);
    for v in [-0.001, 10.001, f64::NAN] {
        let err = key.color_of(&v).unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}

#[test]
fn hsb_and_rgb_lines_disagree_between_the_same_endpoints() {
    let blue = Color::rgb(0, 0, 255);
    let rgb = ScaledKey::<i32>::builder()
        .min(0)
        .max(100)
        .min_color(RED)
        .max_color(blue)
        .build()
        .unwrap();
    let hsb = ScaledKey::<i32>::builder()
        .min(0)
        .max(100)
        .min_color(RED)
        .max_color(blue)
        .space(ColorSpace::Hsb)
        .build()
        .unwrap();
    // the straight RGB line passes through purple; the hue sweep
    // passes through green
    assert_eq!(rgb.color_of(&50).unwrap(), Color::rgb(128, 0, 128));
    assert_eq!(hsb.color_of(&50).unwrap(), Color::rgb(0, 255, 0));
}

#[test]
fn overlapping_scales_cannot_share_a_key() {
    let mut key = MultiScaleKey::new();
    key.add_scale(grey(0.0, 10.0)).unwrap();
    assert!(key.add_scale(grey(5.0, 15.0)).is_err());
    assert!(key.add_scale(grey(10.0, 20.0)).is_err());
    key.add_scale(grey(10.1, 20.0)).unwrap();
    assert_eq!(key.len(), 2);
}

#[test]
fn colour_collisions_across_scales_decode_ambiguously() {
    // disjoint value ranges, but the same line through colour space
    let key = MultiScaleKey::from_scales([grey(0.0, 10.0), grey(20.0, 30.0)]).unwrap();
    let err = key.entry_of(Color::rgb(128, 128, 128)).unwrap_err();
    assert!(matches!(err, KeyError::Ambiguous { .. }));
    assert!(err.to_string().contains("mbiguous"));
}

#[test]
fn disjoint_colour_lines_decode_cleanly() {
    let low = grey(0.0, 10.0);
    let high = ScaledKey::builder()
        .min(20.0)
        .max(30.0)
        .min_color(RED)
        .max_color(YELLOW)
        .tolerance(0.01)
        .build()
        .unwrap();
    let key = MultiScaleKey::from_scales([low, high]).unwrap();
    let c = key.color_of(&5.0).unwrap();
    assert!((key.entry_of(c).unwrap() - 5.0).abs() < 0.1);
    let c = key.color_of(&28.0).unwrap();
    assert!((key.entry_of(c).unwrap() - 28.0).abs() < 0.1);
}

#[test]
fn mapped_keys_stay_bijective() {
    let mut key = MappedKey::new();
    key.insert(1, BLACK).unwrap();
    key.insert(2, WHITE).unwrap();
    key.insert(1, BLACK).unwrap();
    assert!(key.insert(3, BLACK).is_err());
    assert!(key.insert(1, RED).is_err());
    assert_eq!(key.len(), 2);
    assert_eq!(key.entry_of(WHITE).unwrap(), 2);
}
