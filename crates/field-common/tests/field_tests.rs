//! Tests for grids, fields, time keys and style sets.

use std::sync::Arc;

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use field_common::{
    Color, FieldData, FieldError, Grid, GridKind, PlotStyle, RawScalarField, StyleSet, TimeKey,
    ValidTime,
};
use projection::LambertConformal;
use test_utils::{create_f16_ones, hourly_times, reference_time, regular_nodes, sheared_nodes};

// ============================================================================
// Grids
// ============================================================================

#[test]
fn test_curvilinear_grid_from_nodes() {
    let (lats, lons) = sheared_nodes(4, 3, (-100.0, 30.0, -90.0, 40.0), 0.5);
    let grid = Grid::new(4, 3, lats, lons).unwrap();

    assert_eq!(grid.kind(), GridKind::Curvilinear);
    assert_eq!(grid.len(), 12);
    assert_eq!(grid.texcoord_margins(), (0.125, 0.5 / 3.0));
}

#[test]
fn test_identical_nodes_share_fingerprint() {
    let (lats, lons) = regular_nodes(5, 5, (-100.0, 30.0, -90.0, 40.0));
    let from_nodes = Grid::new(5, 5, lats, lons).unwrap();
    let constructed = Grid::plate_carree(5, 5, -100.0, 30.0, -90.0, 40.0).unwrap();

    // Same nodes, different constructor
    assert_eq!(from_nodes.fingerprint(), constructed.fingerprint());

    let taller = Grid::plate_carree(5, 5, -100.0, 30.0, -90.0, 45.0).unwrap();
    assert_ne!(constructed.fingerprint(), taller.fingerprint());
}

#[test]
fn test_lambert_grid() {
    let proj = LambertConformal::hrrr().thinned(60);
    let grid = Grid::lambert_conformal(&proj).unwrap();

    assert_eq!(grid.kind(), GridKind::LambertConformal);
    assert_eq!((grid.ni(), grid.nj()), proj.dimensions());

    // HRRR covers the contiguous US
    for (lat, lon) in grid.lats().iter().zip(grid.lons()) {
        assert!((15.0..60.0).contains(lat), "lat {}", lat);
        assert!((-140.0..-55.0).contains(lon), "lon {}", lon);
    }
}

// ============================================================================
// Fields
// ============================================================================

#[test]
fn test_half_precision_field() {
    let grid = Arc::new(Grid::plate_carree(3, 3, 0.0, 0.0, 2.0, 2.0).unwrap());
    let field = RawScalarField::new(Arc::clone(&grid), FieldData::F16(create_f16_ones(9))).unwrap();

    assert!(field.is_float16());
    assert_eq!(field.data().bytes_per_value(), 2);
    assert!(Arc::ptr_eq(field.grid(), &grid));
}

#[test]
fn test_field_must_match_grid() {
    let grid = Arc::new(Grid::plate_carree(3, 3, 0.0, 0.0, 2.0, 2.0).unwrap());

    let err = RawScalarField::new(grid, FieldData::F16(create_f16_ones(8))).unwrap_err();
    assert_eq!(err, FieldError::shape_mismatch("field data", 9, 8));
}

// ============================================================================
// Time keys
// ============================================================================

#[test]
fn test_same_hour_same_key() {
    let t0 = reference_time();
    let a = TimeKey::from_datetime(&(t0 + Duration::minutes(5)));
    let b = TimeKey::from_datetime(&(t0 + Duration::minutes(55)));
    let c = TimeKey::from_datetime(&(t0 + Duration::minutes(60)));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a < c);
}

#[test]
fn test_key_normalised_to_utc() {
    let tz = FixedOffset::east_opt(9 * 3600).unwrap();
    let tokyo = tz.with_ymd_and_hms(2023, 1, 12, 21, 0, 0).unwrap();

    assert_eq!(TimeKey::from_datetime(&tokyo).as_str(), "2023011212");
}

#[test]
fn test_key_round_trip_is_top_of_hour() {
    let t = Utc.with_ymd_and_hms(2023, 6, 1, 18, 42, 17).unwrap();
    let key = TimeKey::from_datetime(&t);

    assert_eq!(
        key.to_datetime().unwrap(),
        Utc.with_ymd_and_hms(2023, 6, 1, 18, 0, 0).unwrap()
    );
    assert_eq!(TimeKey::parse(key.as_str()).unwrap(), key);
}

#[test]
fn test_invalid_keys_rejected() {
    for s in ["", "2023", "2023011225", "20230112ab", "2023011212x"] {
        assert!(
            matches!(TimeKey::parse(s), Err(FieldError::InvalidTime(_))),
            "{:?} parsed",
            s
        );
    }
}

#[test]
fn test_forecast_hours_map_to_consecutive_keys() {
    let reference = reference_time();
    let keys: Vec<TimeKey> = (0..3).map(|h| ValidTime::new(reference, h).time_key()).collect();
    let expected: Vec<TimeKey> = hourly_times(reference, 3)
        .iter()
        .map(TimeKey::from_datetime)
        .collect();

    assert_eq!(keys, expected);
    assert_eq!(ValidTime::analysis(reference).valid_datetime(), reference);
}

// ============================================================================
// Style sets
// ============================================================================

#[test]
fn test_contour_levels_and_array_color() {
    let json = r##"{
        "version": "2.0",
        "styles": {
            "isotherms": {
                "type": "contour",
                "color": [255, 0, 0],
                "levels": [-10, 0, 10, 20]
            }
        }
    }"##;

    let set = StyleSet::from_json(json).unwrap();
    set.validate().unwrap();
    assert_eq!(set.version, "2.0");

    let Some(PlotStyle::Contour(style)) = set.get("isotherms") else {
        panic!("Expected contour style");
    };
    assert_eq!(style.levels, vec![-10.0, 0.0, 10.0, 20.0]);
    assert_eq!(style.interval, 1.0);
    assert_eq!(style.color, Color::Array(vec![255, 0, 0]));
}

#[test]
fn test_invalid_style_named_in_error() {
    let json = r##"{
        "styles": {
            "bad_ramp": {
                "type": "raster",
                "stops": [{"value": 0, "color": "#000000"}]
            }
        }
    }"##;

    let set = StyleSet::from_json(json).unwrap();
    match set.validate() {
        Err(FieldError::InvalidStyle(msg)) => assert!(msg.starts_with("bad_ramp:"), "{}", msg),
        other => panic!("Expected InvalidStyle, got {:?}", other),
    }
}

#[test]
fn test_malformed_json_is_style_error() {
    let err = StyleSet::from_json("{\"styles\": ").unwrap_err();
    assert!(matches!(err, FieldError::InvalidStyle(_)));
}

#[test]
fn test_missing_style() {
    let set = StyleSet::from_json(r#"{"styles": {}}"#).unwrap();
    assert!(set.validate().is_ok());
    assert!(set.get("anything").is_none());
}
