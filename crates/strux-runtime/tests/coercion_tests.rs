//! Instance coercion and the class-coercing collections

mod common;

use common::*;
use common::assert_eq;
use rstest::rstest;
use strux_runtime::{
    to_instance, BatchMode, Class, ClsArr, ClsDict, ClsMap, ClsSet, Policy, Value,
};

fn sequential() -> Policy {
    Policy {
        batch: BatchMode::Sequential,
        ..Policy::default()
    }
}

#[test]
fn test_coercion_is_idempotent() {
    let mock = mock_class();
    let once = to_instance(rec(&[("one", 1)]), &mock).unwrap();
    let twice = to_instance(Value::Instance(once.clone()), &mock).unwrap();
    assert!(twice.ptr_eq(&once));
}

#[test]
fn test_superclass_instance_is_upgraded() {
    let sup = Class::builder("Sup").build();
    let sub = Class::builder("Sub").extends(&sup).build();

    let old = sup.construct(Value::Undefined).unwrap();
    let new = to_instance(Value::Instance(old.clone()), &sub).unwrap();
    assert!(!new.ptr_eq(&old));
    assert!(new.is_exact(&sub));

    let already = sub.construct(Value::Undefined).unwrap();
    let kept = to_instance(Value::Instance(already.clone()), &sub).unwrap();
    assert!(kept.ptr_eq(&already));
}

// Rejections come from the Mock constructor; the collections only call it.

#[rstest]
fn test_arr_rejects_invalid_inputs(#[values(0, 1, 2, 3, 4)] which: usize) {
    let mut arr = ClsArr::new(&mock_class());
    let err = arr.push(rejected_inputs()[which].clone()).unwrap_err();
    assert!(err.to_string().contains("type mismatch"));
    assert!(arr.is_empty());
}

#[test]
fn test_arr_instantiates() {
    let mock = mock_class();
    let from_ctor = ClsArr::from_values(&mock, [rec0()]).unwrap();
    assert!(from_ctor[0].is_exact(&mock));

    let mut arr = ClsArr::new(&mock);
    arr.push(rec0()).unwrap();
    assert!(arr[0].is_exact(&mock));
    assert!(arr.to_value().as_array().is_some());
}

#[test]
fn test_arr_preserves_instances() {
    let mock = mock_class();
    let val = mock.construct(rec0()).unwrap();
    let arr = ClsArr::from_values(&mock, [Value::Instance(val.clone())]).unwrap();
    assert!(arr[0].ptr_eq(&val));
}

#[test]
fn test_arr_batch_atomic() {
    let mock = mock_class();
    let mut arr = ClsArr::new(&mock);
    arr.push(rec(&[("n", 0)])).unwrap();

    assert!(arr.push_all([rec(&[("n", 1)]), Value::from(10)]).is_err());
    assert!(arr.unshift_all([rec(&[("n", 1)]), Value::Null]).is_err());
    assert_eq!(arr.len(), 1);
}

#[test]
fn test_arr_batch_sequential() {
    let mock = mock_class();
    let mut arr = ClsArr::with_policy(&mock, &sequential());

    assert!(arr
        .push_all([rec(&[("n", 1)]), Value::from(10), rec(&[("n", 2)])])
        .is_err());
    assert_eq!(arr.len(), 1);

    assert!(arr.unshift_all([rec(&[("n", 0)]), Value::Null]).is_err());
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0].get("n"), Some(Value::from(0)));
    assert_eq!(arr[1].get("n"), Some(Value::from(1)));
}

#[test]
fn test_initial_values_follow_batch_policy() {
    let mock = mock_class();
    let input = || [rec(&[("n", 1)]), Value::from(10), rec(&[("n", 2)])];

    assert!(ClsArr::from_values_with(&mock, &Policy::default(), input()).is_err());
    assert!(ClsSet::from_values_with(&mock, &Policy::default(), input()).is_err());

    assert!(ClsArr::from_values_with(&mock, &sequential(), input())
        .unwrap_err()
        .is_type_mismatch());

    let mut arr = ClsArr::from_values_with(&mock, &sequential(), [rec0()]).unwrap();
    assert!(arr.push_all(input()).is_err());
    assert_eq!(arr.len(), 2);

    let mut set = ClsSet::from_values_with(&mock, &sequential(), [rec0()]).unwrap();
    assert!(set.add_all(input()).is_err());
    assert_eq!(set.len(), 2);

    let mut dict = ClsDict::from_value_with(&mock, &sequential(), &Value::Null).unwrap();
    assert!(dict
        .patch(&Value::record([("one", rec0()), ("two", Value::from(10))]))
        .is_err());
    assert!(dict.has("one"));
}

#[test]
fn test_arr_batch_keeps_call_order() {
    let mock = mock_class();
    let mut arr = ClsArr::new(&mock);
    arr.push_all([rec(&[("n", 1)]), rec(&[("n", 2)])]).unwrap();
    arr.unshift_all([rec(&[("n", -1)]), rec(&[("n", 0)])]).unwrap();

    let order: Vec<Value> = arr.iter().map(|i| i.get("n").unwrap()).collect();
    assert_eq!(
        order,
        vec![Value::from(-1), Value::from(0), Value::from(1), Value::from(2)]
    );
}

#[test]
fn test_set_rejects_invalid_inputs() {
    let mut set = ClsSet::new(&mock_class());
    for bad in rejected_inputs() {
        assert!(set.add(bad).unwrap_err().is_type_mismatch());
    }
    assert!(set.is_empty());
}

#[test]
fn test_set_instantiates_and_preserves() {
    let mock = mock_class();
    let set = ClsSet::from_values(&mock, [rec0()]).unwrap();
    assert!(set.iter().next().unwrap().is_exact(&mock));

    let val = mock.construct(rec0()).unwrap();
    let set = ClsSet::from_values(&mock, [Value::Instance(val.clone())]).unwrap();
    assert!(set.iter().next().unwrap().ptr_eq(&val));
}

#[test]
fn test_set_batch_modes() {
    let mock = mock_class();
    let input = || [rec0(), Value::from("one")];

    let mut atomic = ClsSet::new(&mock);
    assert!(atomic.add_all(input()).is_err());
    assert_eq!(atomic.len(), 0);

    let mut partial = ClsSet::with_policy(&mock, &sequential());
    assert!(partial.add_all(input()).is_err());
    assert_eq!(partial.len(), 1);
}

#[test]
fn test_map_rejects_invalid_inputs() {
    let mut map: ClsMap<i32> = ClsMap::new(&mock_class());
    assert!(map.set(10, Value::Undefined).is_err());
    for bad in rejected_inputs() {
        assert!(map.set(10, bad).unwrap_err().is_type_mismatch());
    }
    assert!(map.is_empty());
}

#[test]
fn test_map_instantiates_and_preserves() {
    let mock = mock_class();
    let map = ClsMap::from_entries(&mock, [(10, rec0())]).unwrap();
    assert!(map.get(&10).unwrap().is_exact(&mock));

    let val = mock.construct(rec0()).unwrap();
    let mut map = ClsMap::new(&mock);
    map.set(10, Value::Instance(val.clone())).unwrap();
    assert!(map.get(&10).unwrap().ptr_eq(&val));
}

#[test]
fn test_dict_coerces_and_serializes() {
    let mock = mock_class();
    let dict = ClsDict::from_value(
        &mock,
        &Value::array(vec![Value::array(vec![
            Value::from("one"),
            rec(&[("val", 10)]),
        ])]),
    )
    .unwrap();

    assert!(dict.get("one").unwrap().is_exact(&mock));
    assert_eq!(dict.to_json().unwrap(), r#"{"one":{"val":10}}"#);
}

#[test]
fn test_dict_patch_sequential() {
    let mock = mock_class();
    let mut dict = ClsDict::with_policy(&mock, &sequential());
    let patch = Value::record([("one", rec0()), ("two", Value::from(10)), ("three", rec0())]);

    assert!(dict.patch(&patch).is_err());
    assert!(dict.has("one"));
    assert!(!dict.has("three"));
}
