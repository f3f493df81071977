//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use vispipe_rs::data::{ArrayValues, DataObject, DataObjectRef, DataSet, FieldAssociation};
use vispipe_rs::pipeline::Executive;

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Route library logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vispipe_rs=trace")
        .with_test_writer()
        .try_init();
}

/// Output data object of port 0, panicking if there is none.
pub fn output_of(executive: &Executive) -> DataObjectRef {
    executive
        .output_data(0)
        .unwrap_or_else(|| panic!("'{}' has no output data", executive.name()))
}

/// Number of points on the `DataSet` at output port 0.
pub fn point_count(executive: &Executive) -> usize {
    let data = output_of(executive);
    let data = data.borrow();
    data.as_any()
        .downcast_ref::<DataSet>()
        .map(DataSet::number_of_points)
        .unwrap_or_else(|| panic!("'{}' output is not a DataSet", executive.name()))
}

/// Values of a point array at output port 0, widened to f64.
pub fn point_values(executive: &Executive, name: &str) -> Vec<f64> {
    let data = output_of(executive);
    let data = data.borrow();
    let array = data
        .attributes(FieldAssociation::Points)
        .and_then(|points| points.array(name))
        .unwrap_or_else(|| panic!("no point array '{}' on '{}'", name, executive.name()))
        .clone();
    match array.values() {
        ArrayValues::F64(v) => v.clone(),
        ArrayValues::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayValues::I64(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayValues::I32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        ArrayValues::U8(v) => v.iter().map(|&x| f64::from(x)).collect(),
    }
}
