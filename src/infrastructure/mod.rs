#![allow(dead_code)]

pub mod cache;
