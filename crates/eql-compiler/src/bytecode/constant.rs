//! Constant pool for compiled queries.
//!
//! Literals too large for a dedicated push opcode live here, shared by all
//! functions of one query.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    /// Ordered so the pool can deduplicate floats by hashing.
    Float(OrderedFloat<f64>),
    String(String),
}

/// Query-level constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<Constant, usize>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or find a constant and return its index.
    pub fn add(&mut self, constant: Constant) -> usize {
        if let Some(&idx) = self.index.get(&constant) {
            return idx;
        }
        let idx = self.constants.len();
        self.constants.push(constant.clone());
        self.index.insert(constant, idx);
        idx
    }

    pub fn add_int(&mut self, value: i64) -> usize {
        self.add(Constant::Int(value))
    }

    pub fn add_float(&mut self, value: f64) -> usize {
        self.add(Constant::Float(OrderedFloat(value)))
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> usize {
        self.add(Constant::String(value.into()))
    }

    pub fn get(&self, index: usize) -> Option<&Constant> {
        self.constants.get(index)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}
