// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod Utils;
pub mod config;
pub mod error;
pub mod numerical;
pub mod pipeline;
pub mod statistics;
pub mod tabular;
