use super::*;

fn store_with(time: Vec<f64>, data: Vec<f64>) -> (ChannelStore, ChannelId) {
    let mut store = ChannelStore::new();
    let id = store.register("c", time, data).unwrap();
    (store, id)
}

#[test]
fn register_rejects_length_mismatch() {
    let mut store = ChannelStore::new();
    let err = store
        .register("thrust", vec![0.0, 1.0], vec![1.0])
        .unwrap_err();
    assert!(matches!(err, OverplotError::Validation(_)));
    assert!(store.is_empty());
}

#[test]
fn register_rejects_unsorted_and_nan_time() {
    let mut store = ChannelStore::new();
    assert!(store.register("a", vec![0.0, 2.0, 1.0], vec![0.0; 3]).is_err());
    assert!(store.register("b", vec![0.0, f64::NAN], vec![0.0; 2]).is_err());
}

#[test]
fn slice_is_inclusive_on_both_ends() {
    let (store, id) = store_with(vec![-1.0, 0.0, 1.0, 2.0], vec![10.0, 20.0, 30.0, 40.0]);
    let s = store.slice(id, 0.0, 1.0).unwrap();
    assert_eq!(s.time, &[0.0, 1.0]);
    assert_eq!(s.data, &[20.0, 30.0]);
}

#[test]
fn slice_outside_range_is_empty_not_error() {
    let (store, id) = store_with(vec![0.0, 1.0], vec![1.0, 2.0]);
    assert!(store.slice(id, 5.0, 6.0).unwrap().is_empty());
    assert!(store.slice(id, -3.0, -2.0).unwrap().is_empty());
    assert!(store.slice(id, 0.2, 0.8).unwrap().is_empty());
}

#[test]
fn slice_keeps_duplicate_timestamps_in_order() {
    let (store, id) = store_with(vec![0.0, 1.0, 1.0, 1.0, 2.0], vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    let s = store.slice(id, 1.0, 1.0).unwrap();
    assert_eq!(s.data, &[1.0, 2.0, 3.0]);
    let pts: Vec<_> = s.points().collect();
    assert_eq!(pts, vec![(1.0, 1.0), (1.0, 2.0), (1.0, 3.0)]);
}

#[test]
fn slice_matches_a_linear_scan() {
    let time: Vec<f64> = (0..500).map(|i| f64::from(i) * 0.013 - 1.7).collect();
    let data: Vec<f64> = time.iter().map(|t| t.sin()).collect();
    let (store, id) = store_with(time.clone(), data);
    for (a, b) in [(-2.0, -1.0), (0.0, 0.013), (1.3, 4.9), (6.5, 7.0), (0.5, 0.4)] {
        let expected: Vec<f64> = time.iter().copied().filter(|&t| a <= t && t <= b).collect();
        assert_eq!(store.slice(id, a, b).unwrap().time, expected.as_slice());
    }
}

#[test]
fn data_bounds_skip_non_finite_samples() {
    let mut store = ChannelStore::new();
    store
        .register("a", vec![0.0, 1.0, 2.0], vec![-3.0, f64::NAN, 5.0])
        .unwrap();
    store.register("b", vec![0.0], vec![7.5]).unwrap();
    assert_eq!(store.data_bounds(), Some((-3.0, 7.5)));
    assert_eq!(ChannelStore::new().data_bounds(), None);
}

#[test]
fn unknown_channel_id_is_rejected() {
    let store = ChannelStore::new();
    assert!(store.slice(ChannelId(3), 0.0, 1.0).is_err());
}
