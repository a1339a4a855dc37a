use super::*;

#[test]
fn auto_scale_multiplies_extremes_by_margin() {
    let mut store = ChannelStore::new();
    store
        .register("a", vec![0.0, 1.0, 2.0], vec![-10.0, 3.0, 40.0])
        .unwrap();
    store
        .register("b", vec![0.0, 1.0], vec![-20.0, 5.0])
        .unwrap();
    let (min, max) = AxisScale::Auto.resolve(&store).unwrap();
    assert!((min - (-20.0 * 1.1)).abs() < 1e-9);
    assert!((max - 40.0 * 1.1).abs() < 1e-9);
}

#[test]
fn explicit_ylim_is_used_verbatim() {
    let mut store = ChannelStore::new();
    store.register("a", vec![0.0], vec![1000.0]).unwrap();
    let scale = AxisScale::from_ylim(Some((-30.0, 80.0)));
    assert_eq!(scale.resolve(&store).unwrap(), (-30.0, 80.0));
}

#[test]
fn auto_scale_without_data_is_validation_error() {
    let err = AxisScale::Auto.resolve(&ChannelStore::new()).unwrap_err();
    assert!(matches!(err, OverplotError::Validation(_)));
}

#[test]
fn degenerate_range_is_widened() {
    let mut store = ChannelStore::new();
    store
        .register("flat", vec![0.0, 1.0], vec![0.0, 0.0])
        .unwrap();
    assert_eq!(AxisScale::Auto.resolve(&store).unwrap(), (-1.0, 1.0));
}

#[test]
fn inverted_explicit_ylim_is_rejected() {
    let scale = AxisScale::Explicit { min: 5.0, max: 1.0 };
    assert!(scale.resolve(&ChannelStore::new()).is_err());
}

#[test]
fn positive_only_data_stays_inside_auto_range() {
    let mut store = ChannelStore::new();
    store
        .register("thrust", vec![0.0, 1.0], vec![5.0, 10.0])
        .unwrap();
    let (min, max) = AxisScale::Auto.resolve(&store).unwrap();
    assert_eq!(min, 0.0);
    assert!((max - 11.0).abs() < 1e-9);
}

#[test]
fn negative_only_data_stays_inside_auto_range() {
    let mut store = ChannelStore::new();
    store
        .register("vacuum", vec![0.0, 1.0], vec![-8.0, -2.0])
        .unwrap();
    let (min, max) = AxisScale::Auto.resolve(&store).unwrap();
    assert!((min - (-8.8)).abs() < 1e-9);
    assert_eq!(max, 0.0);
}
