//! Application layer - lowering method bodies into PAG fragments

pub mod fragment;

pub use fragment::{materialize, Capture, FragmentCall, FuncPag, TemplateEdge, TemplateNode};
