/// Return-address stack mock.
pub mod ras;
