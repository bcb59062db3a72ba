// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]
pub mod Utils;
pub mod error;
pub mod graphic;
pub mod numerical;
pub mod symbolic;
