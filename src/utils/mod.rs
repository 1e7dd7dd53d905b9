pub mod normalization;
pub mod validators;
