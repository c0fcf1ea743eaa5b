//! Stack machine executing compiled queries.
//!
//! One [`Machine`] serves a whole table scan. Per event it resets the stack,
//! the locals and the object heap, runs the main function and turns the
//! returned value into a result row. Method calls push onto an explicit
//! frame stack, bounded by the query's call depth limit.

mod slot;

pub use slot::{Object, VmSlot};

use std::collections::BTreeMap;

use eql_core::{ExecutionError, Value};
use eql_table::{Event, Table};

use crate::bytecode::{BytecodeChunk, Constant, OpCode};
use crate::query::{CompiledFunction, CompiledQuery};
use crate::symbols::{EVENT_ID_FIELD, EVENT_TIMESTAMP_FIELD};

/// Where an event field read by the query comes from.
#[derive(Debug, Clone, Copy)]
enum FieldSource {
    ObjectId,
    Timestamp,
    Property(i64),
    /// Not in the table's schema; reads as the type's zero value.
    Missing,
}

/// An active function call.
#[derive(Clone, Copy)]
struct Frame<'a> {
    function: &'a CompiledFunction,
    /// Resume offset; only current while the frame is suspended in a call.
    ip: usize,
    /// First local slot of this frame.
    base: usize,
}

pub(crate) struct Machine<'a> {
    query: &'a CompiledQuery,
    table: &'a dyn Table,
    sources: Vec<FieldSource>,
    frames: Vec<Frame<'a>>,
    stack: Vec<VmSlot>,
    locals: Vec<VmSlot>,
    heap: Vec<Object>,
    object_id: &'a str,
    event: Option<&'a Event>,
}

impl<'a> Machine<'a> {
    pub(crate) fn new(query: &'a CompiledQuery, table: &'a dyn Table) -> Self {
        let schema = table.schema();
        let sources = query
            .event_fields
            .iter()
            .map(|(name, _)| match name.as_str() {
                EVENT_ID_FIELD => FieldSource::ObjectId,
                EVENT_TIMESTAMP_FIELD => FieldSource::Timestamp,
                _ => schema
                    .property(name)
                    .map_or(FieldSource::Missing, |p| FieldSource::Property(p.id)),
            })
            .collect();
        Self {
            query,
            table,
            sources,
            frames: Vec::new(),
            stack: Vec::new(),
            locals: Vec::new(),
            heap: Vec::new(),
            object_id: "",
            event: None,
        }
    }

    /// Run `main` for one event; returns the row when it returned a value.
    pub(crate) fn run_event(
        &mut self,
        main: usize,
        object_id: &'a str,
        event: &'a Event,
    ) -> Result<Option<Vec<Value>>, ExecutionError> {
        self.object_id = object_id;
        self.event = Some(event);
        self.frames.clear();
        self.stack.clear();
        self.locals.clear();
        self.heap.clear();

        self.push_frame(main)?;
        let Some(returned) = self.run()? else {
            return Ok(None);
        };

        let mut row = vec![Value::String(object_id.to_string()), Value::Int(event.timestamp)];
        match (self.query.returned_class(), &returned) {
            (Some(_), VmSlot::Object(index)) => {
                let object = self.object(*index)?;
                let fields: Vec<Value> = object.fields.iter().map(|f| self.to_value(f, &mut Vec::new())).collect();
                row.extend(fields);
            }
            (Some(class), _) => row.extend(class.fields.iter().map(|_| Value::Null)),
            (None, slot) => row.push(self.to_value(slot, &mut Vec::new())),
        }
        Ok(Some(row))
    }

    /// Enter function `index`, moving its arguments from the stack into locals.
    fn push_frame(&mut self, index: usize) -> Result<(), ExecutionError> {
        let limit = self.query.max_call_depth;
        if self.frames.len() >= limit {
            return Err(ExecutionError::CallDepthExceeded { limit });
        }
        let query = self.query;
        let function = query
            .functions
            .get(index)
            .ok_or_else(|| invalid(format!("call to missing function {index}")))?;

        let base = self.locals.len();
        let args_start = self
            .stack
            .len()
            .checked_sub(function.arity)
            .ok_or_else(|| invalid(format!("'{}' called with too few arguments", function.name)))?;
        self.locals.extend(self.stack.drain(args_start..));
        self.locals.resize(base + function.local_count, VmSlot::Null);
        self.frames.push(Frame { function, ip: 0, base });
        Ok(())
    }

    fn current_frame(&self) -> Result<(&'a CompiledFunction, usize, usize), ExecutionError> {
        let frame = self.frames.last().ok_or_else(|| invalid("no active frame"))?;
        Ok((frame.function, frame.base, frame.ip))
    }

    /// Run until the outermost frame returns.
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn run(&mut self) -> Result<Option<VmSlot>, ExecutionError> {
        let query = self.query;
        let (mut function, mut base, mut ip) = self.current_frame()?;

        loop {
            let chunk = &function.chunk;
            let line = chunk.line_at(ip).unwrap_or_default();
            let op = chunk
                .read_op(ip)
                .ok_or_else(|| invalid(format!("no instruction at offset {ip} of '{}'", function.name)))?;
            ip += 1;

            match op {
                OpCode::Constant => {
                    let index = read_operand(chunk, &mut ip)?;
                    let slot = match query.constants.get(index) {
                        Some(Constant::Int(v)) => VmSlot::Int(*v),
                        Some(Constant::Float(v)) => VmSlot::Float(v.into_inner()),
                        Some(Constant::String(v)) => VmSlot::String(v.clone()),
                        None => return Err(invalid(format!("missing constant {index}"))),
                    };
                    self.stack.push(slot);
                }
                OpCode::PushNull => self.stack.push(VmSlot::Null),
                OpCode::PushTrue => self.stack.push(VmSlot::Bool(true)),
                OpCode::PushFalse => self.stack.push(VmSlot::Bool(false)),
                OpCode::PushZero => self.stack.push(VmSlot::Int(0)),
                OpCode::PushOne => self.stack.push(VmSlot::Int(1)),
                OpCode::Pop => {
                    self.pop()?;
                }
                OpCode::Dup => {
                    let top = self.stack.last().cloned().ok_or_else(|| invalid("stack underflow"))?;
                    self.stack.push(top);
                }

                OpCode::GetLocal => {
                    let slot = base + read_operand(chunk, &mut ip)?;
                    let value = self.locals.get(slot).cloned().ok_or_else(|| invalid(format!("no local slot {slot}")))?;
                    self.stack.push(value);
                }
                OpCode::SetLocal => {
                    let slot = base + read_operand(chunk, &mut ip)?;
                    let value = self.pop()?;
                    let local = self.locals.get_mut(slot).ok_or_else(|| invalid(format!("no local slot {slot}")))?;
                    *local = value;
                }

                OpCode::GetField => {
                    let field = read_operand(chunk, &mut ip)?;
                    let target = self.pop()?;
                    let index = self.object_index(&target, line)?;
                    let value = self
                        .object(index)?
                        .fields
                        .get(field)
                        .cloned()
                        .ok_or_else(|| invalid(format!("no field {field}")))?;
                    self.stack.push(value);
                }
                OpCode::SetField => {
                    let field = read_operand(chunk, &mut ip)?;
                    let value = self.pop()?;
                    let target = self.pop()?;
                    let index = self.object_index(&target, line)?;
                    let slot = self
                        .heap
                        .get_mut(index)
                        .and_then(|o| o.fields.get_mut(field))
                        .ok_or_else(|| invalid(format!("no field {field}")))?;
                    *slot = value;
                }
                OpCode::GetEvent => self.stack.push(VmSlot::Event),
                OpCode::GetEventField => {
                    let field = read_operand(chunk, &mut ip)?;
                    match self.pop()? {
                        VmSlot::Event => {
                            let value = self.event_field(field, line)?;
                            self.stack.push(value);
                        }
                        VmSlot::Null => return Err(ExecutionError::NullReference { line }),
                        other => return Err(type_fault(line, "Event", &other)),
                    }
                }
                OpCode::New => {
                    let class = read_operand(chunk, &mut ip)?;
                    let layout = query.classes.get(class).ok_or_else(|| invalid(format!("no class {class}")))?;
                    self.heap.push(Object {
                        class,
                        fields: layout.fields.iter().map(|(_, ty)| VmSlot::default_for(ty)).collect(),
                    });
                    self.stack.push(VmSlot::Object(self.heap.len() - 1));
                }

                OpCode::Call => {
                    let callee = read_operand(chunk, &mut ip)?;
                    let arity = query.functions.get(callee).map_or(0, |f| f.arity);
                    let receiver = self.stack.len().checked_sub(arity).and_then(|i| self.stack.get(i));
                    if matches!(receiver, Some(VmSlot::Null)) {
                        return Err(ExecutionError::NullReference { line });
                    }
                    if let Some(frame) = self.frames.last_mut() {
                        frame.ip = ip;
                    }
                    self.push_frame(callee)?;
                    (function, base, ip) = self.current_frame()?;
                }
                OpCode::Return | OpCode::ReturnVoid => {
                    let value = if op == OpCode::Return { Some(self.pop()?) } else { None };
                    self.frames.pop();
                    self.locals.truncate(base);
                    if self.frames.is_empty() {
                        return Ok(value);
                    }
                    if let Some(value) = value {
                        self.stack.push(value);
                    }
                    (function, base, ip) = self.current_frame()?;
                }

                OpCode::AddInt => self.int_op(line, |a, b| VmSlot::Int(a.wrapping_add(b)))?,
                OpCode::SubInt => self.int_op(line, |a, b| VmSlot::Int(a.wrapping_sub(b)))?,
                OpCode::MulInt => self.int_op(line, |a, b| VmSlot::Int(a.wrapping_mul(b)))?,
                OpCode::DivInt | OpCode::ModInt => {
                    let b = self.pop_int(line)?;
                    let a = self.pop_int(line)?;
                    if b == 0 {
                        return Err(ExecutionError::DivisionByZero { line });
                    }
                    let result = if op == OpCode::DivInt { a.wrapping_div(b) } else { a.wrapping_rem(b) };
                    self.stack.push(VmSlot::Int(result));
                }
                OpCode::NegInt => {
                    let a = self.pop_int(line)?;
                    self.stack.push(VmSlot::Int(a.wrapping_neg()));
                }

                OpCode::AddFloat => self.float_op(line, |a, b| VmSlot::Float(a + b))?,
                OpCode::SubFloat => self.float_op(line, |a, b| VmSlot::Float(a - b))?,
                OpCode::MulFloat => self.float_op(line, |a, b| VmSlot::Float(a * b))?,
                OpCode::DivFloat => self.float_op(line, |a, b| VmSlot::Float(a / b))?,
                OpCode::ModFloat => self.float_op(line, |a, b| VmSlot::Float(a % b))?,
                OpCode::NegFloat => {
                    let a = self.pop_float(line)?;
                    self.stack.push(VmSlot::Float(-a));
                }

                OpCode::IntToFloat => {
                    let a = self.pop_int(line)?;
                    self.stack.push(VmSlot::Float(a as f64));
                }
                OpCode::Concat => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    match (a, b) {
                        (VmSlot::String(mut a), VmSlot::String(b)) => {
                            a.push_str(&b);
                            self.stack.push(VmSlot::String(a));
                        }
                        (VmSlot::String(_), other) | (other, _) => return Err(type_fault(line, "String", &other)),
                    }
                }

                OpCode::Equal | OpCode::NotEqual => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.stack.push(VmSlot::Bool((a == b) == (op == OpCode::Equal)));
                }
                OpCode::LtInt => self.int_op(line, |a, b| VmSlot::Bool(a < b))?,
                OpCode::LeInt => self.int_op(line, |a, b| VmSlot::Bool(a <= b))?,
                OpCode::GtInt => self.int_op(line, |a, b| VmSlot::Bool(a > b))?,
                OpCode::GeInt => self.int_op(line, |a, b| VmSlot::Bool(a >= b))?,
                OpCode::LtFloat => self.float_op(line, |a, b| VmSlot::Bool(a < b))?,
                OpCode::LeFloat => self.float_op(line, |a, b| VmSlot::Bool(a <= b))?,
                OpCode::GtFloat => self.float_op(line, |a, b| VmSlot::Bool(a > b))?,
                OpCode::GeFloat => self.float_op(line, |a, b| VmSlot::Bool(a >= b))?,
                OpCode::Not => {
                    let a = self.pop_bool(line)?;
                    self.stack.push(VmSlot::Bool(!a));
                }

                OpCode::Jump => {
                    let offset = read_operand(chunk, &mut ip)?;
                    ip += offset;
                }
                OpCode::JumpIfFalse | OpCode::JumpIfTrue => {
                    let offset = read_operand(chunk, &mut ip)?;
                    let condition = self.pop_bool(line)?;
                    if condition == (op == OpCode::JumpIfTrue) {
                        ip += offset;
                    }
                }
                OpCode::Loop => {
                    let offset = read_operand(chunk, &mut ip)?;
                    ip = ip.checked_sub(offset).ok_or_else(|| invalid("loop target before function start"))?;
                }
            }
        }
    }

    // ==========================================================================
    // Stack helpers
    // ==========================================================================

    fn pop(&mut self) -> Result<VmSlot, ExecutionError> {
        self.stack.pop().ok_or_else(|| invalid("stack underflow"))
    }

    fn pop_int(&mut self, line: u32) -> Result<i64, ExecutionError> {
        match self.pop()? {
            VmSlot::Int(v) => Ok(v),
            other => Err(type_fault(line, "Int", &other)),
        }
    }

    fn pop_float(&mut self, line: u32) -> Result<f64, ExecutionError> {
        match self.pop()? {
            VmSlot::Float(v) => Ok(v),
            other => Err(type_fault(line, "Float", &other)),
        }
    }

    fn pop_bool(&mut self, line: u32) -> Result<bool, ExecutionError> {
        match self.pop()? {
            VmSlot::Bool(v) => Ok(v),
            other => Err(type_fault(line, "Boolean", &other)),
        }
    }

    fn int_op(&mut self, line: u32, op: impl FnOnce(i64, i64) -> VmSlot) -> Result<(), ExecutionError> {
        let b = self.pop_int(line)?;
        let a = self.pop_int(line)?;
        self.stack.push(op(a, b));
        Ok(())
    }

    fn float_op(&mut self, line: u32, op: impl FnOnce(f64, f64) -> VmSlot) -> Result<(), ExecutionError> {
        let b = self.pop_float(line)?;
        let a = self.pop_float(line)?;
        self.stack.push(op(a, b));
        Ok(())
    }

    // ==========================================================================
    // Objects and events
    // ==========================================================================

    fn object_index(&self, target: &VmSlot, line: u32) -> Result<usize, ExecutionError> {
        match target {
            VmSlot::Object(index) => Ok(*index),
            VmSlot::Null => Err(ExecutionError::NullReference { line }),
            other => Err(type_fault(line, "object", other)),
        }
    }

    fn object(&self, index: usize) -> Result<&Object, ExecutionError> {
        self.heap.get(index).ok_or_else(|| invalid(format!("no object {index}")))
    }

    fn current_event(&self) -> Result<&'a Event, ExecutionError> {
        self.event.ok_or_else(|| invalid("no current event"))
    }

    fn event_field(&self, index: usize, line: u32) -> Result<VmSlot, ExecutionError> {
        let event = self.current_event()?;
        let (name, ty) = self
            .query
            .event_fields
            .get(index)
            .ok_or_else(|| invalid(format!("no event field {index}")))?;
        let source = self.sources.get(index).copied().unwrap_or(FieldSource::Missing);
        Ok(match source {
            FieldSource::ObjectId => VmSlot::String(self.object_id.to_string()),
            FieldSource::Timestamp => VmSlot::Int(event.timestamp),
            FieldSource::Property(id) => match event.get(id) {
                Some(value) => VmSlot::from_value(value, ty).ok_or_else(|| ExecutionError::TypeFault {
                    line,
                    message: format!("event property '{name}' holds a {} value", value.kind_name()),
                })?,
                None => VmSlot::default_for(ty),
            },
            FieldSource::Missing => VmSlot::default_for(ty),
        })
    }

    /// Convert a slot to a result value. `visiting` guards against cycles
    /// between objects; a repeated object becomes `Null`.
    fn to_value(&self, slot: &VmSlot, visiting: &mut Vec<usize>) -> Value {
        match slot {
            VmSlot::Null => Value::Null,
            VmSlot::Bool(v) => Value::Boolean(*v),
            VmSlot::Int(v) => Value::Int(*v),
            VmSlot::Float(v) => Value::Float(*v),
            VmSlot::String(v) => Value::String(v.clone()),
            VmSlot::Object(index) => {
                let (Some(object), false) = (self.heap.get(*index), visiting.contains(index)) else {
                    return Value::Null;
                };
                let Some(layout) = self.query.classes.get(object.class) else {
                    return Value::Null;
                };
                visiting.push(*index);
                let fields = layout
                    .fields
                    .iter()
                    .zip(&object.fields)
                    .map(|((name, _), field)| (name.clone(), self.to_value(field, visiting)))
                    .collect();
                visiting.pop();
                Value::Object(fields)
            }
            VmSlot::Event => self.event_value(),
        }
    }

    fn event_value(&self) -> Value {
        let mut fields = BTreeMap::new();
        fields.insert(EVENT_ID_FIELD.to_string(), Value::String(self.object_id.to_string()));
        if let Some(event) = self.event {
            fields.insert(EVENT_TIMESTAMP_FIELD.to_string(), Value::Int(event.timestamp));
            let schema = self.table.schema();
            for (id, value) in &event.data {
                if let Some(property) = schema.property_by_id(*id) {
                    fields.insert(property.name.clone(), value.clone());
                }
            }
        }
        Value::Object(fields)
    }
}

fn invalid(message: impl Into<String>) -> ExecutionError {
    ExecutionError::InvalidBytecode {
        message: message.into(),
    }
}

fn type_fault(line: u32, expected: &str, found: &VmSlot) -> ExecutionError {
    ExecutionError::TypeFault {
        line,
        message: format!("expected {expected}, found {}", found.type_name()),
    }
}

fn read_operand(chunk: &BytecodeChunk, ip: &mut usize) -> Result<usize, ExecutionError> {
    let value = chunk.read_u32(*ip).ok_or_else(|| invalid("truncated operand"))?;
    *ip += 4;
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use eql_core::{ExecutionError, Value};
    use eql_table::{DataKind, Event, MemoryTable, Table};
    use pretty_assertions::assert_eq;

    use crate::{Compiler, MAX_CALL_DEPTH_CEILING, ResultSet};

    fn orders() -> MemoryTable {
        let mut table = MemoryTable::new("orders");
        let price = table.create_property("price", DataKind::Float, false).unwrap().id;
        let quantity = table.create_property("quantity", DataKind::Integer, false).unwrap().id;
        table
            .insert_event("a", Event::new(1).with_value(price, 2.5).with_value(quantity, 2i64))
            .unwrap();
        table.insert_event("a", Event::new(2).with_value(price, 0.5)).unwrap();
        table.insert_event("b", Event::new(3).with_value(quantity, 4i64)).unwrap();
        table
    }

    fn run(source: &str) -> Result<ResultSet, ExecutionError> {
        let table = orders();
        let query = Compiler::new().compile("q", source, table.schema()).unwrap();
        query.execute(&table)
    }

    fn values(result: &ResultSet) -> Vec<Value> {
        result.rows.iter().map(|row| row[2].clone()).collect()
    }

    #[test]
    fn one_row_per_returning_event() {
        let result = run("if (event.price > 1.0) {\n  return event.price * event.quantity;\n}").unwrap();
        assert_eq!(result.columns, vec!["id", "timestamp", "value"]);
        assert_eq!(result.rows, vec![vec![Value::String("a".into()), Value::Int(1), Value::Float(5.0)]]);
    }

    #[test]
    fn missing_values_read_as_zero() {
        let result = run("return event.quantity;").unwrap();
        assert_eq!(values(&result), vec![Value::Int(2), Value::Int(0), Value::Int(4)]);
    }

    #[test]
    fn loops_and_locals() {
        let result = run("Int i = 0;\nInt sum = 0;\nwhile (i < 5) {\n  i = i + 1;\n  sum = sum + i;\n}\nreturn sum;").unwrap();
        assert_eq!(values(&result), vec![Value::Int(15); 3]);
    }

    #[test]
    fn string_concatenation() {
        let result = run("return event.id + \"@\" + \"x\";").unwrap();
        assert_eq!(values(&result)[2], Value::String("b@x".into()));
    }

    #[test]
    fn methods_and_fields() {
        let source = "class Counter {
                          Int count;
                          Void add(Int n) { count = count + n; }
                          Int get() { return count; }
                      }
                      Counter c = new Counter();
                      c.add(event.timestamp);
                      c.add(10);
                      return c.get();";
        let result = run(source).unwrap();
        assert_eq!(values(&result), vec![Value::Int(11), Value::Int(12), Value::Int(13)]);
    }

    #[test]
    fn class_return_type_gives_field_columns() {
        let source = "class P { String who; Int twice; }
                      P p = new P();
                      p.who = event.id;
                      p.twice = event.timestamp * 2;
                      if (event.timestamp != 2) { return p; }
                      return null;";
        let result = run(source).unwrap();
        assert_eq!(result.columns, vec!["id", "timestamp", "who", "twice"]);
        assert_eq!(result.rows[0], vec![Value::String("a".into()), Value::Int(1), Value::String("a".into()), Value::Int(2)]);
        assert_eq!(result.rows[1], vec![Value::String("a".into()), Value::Int(2), Value::Null, Value::Null]);
    }

    #[test]
    fn returning_the_event_gives_an_object() {
        let result = run("return event;").unwrap();
        let expected = BTreeMap::from([
            ("id".to_string(), Value::String("b".into())),
            ("timestamp".to_string(), Value::Int(3)),
            ("quantity".to_string(), Value::Int(4)),
        ]);
        assert_eq!(values(&result)[2], Value::Object(expected));
    }

    #[test]
    fn short_circuit_skips_right_operand() {
        let result = run("Int zero = 0;\nreturn zero != 0 && 10 / zero > 1;").unwrap();
        assert_eq!(values(&result), vec![Value::Boolean(false); 3]);
    }

    #[test]
    fn division_by_zero_reports_line() {
        let err = run("Int zero = 0;\nreturn 10 / zero;").unwrap_err();
        assert!(matches!(err, ExecutionError::DivisionByZero { line: 2 }), "{err:?}");
    }

    #[test]
    fn null_field_access() {
        let err = run("class A { Int x; }\nA a = null;\nreturn a.x;").unwrap_err();
        assert!(matches!(err, ExecutionError::NullReference { line: 3 }), "{err:?}");
    }

    #[test]
    fn null_receiver() {
        let err = run("class A { Int f() { return 1; } }\nA a = null;\nreturn a.f();").unwrap_err();
        assert!(matches!(err, ExecutionError::NullReference { line: 3 }), "{err:?}");
    }

    #[test]
    fn runaway_recursion_is_bounded() {
        let source = "class R {
                          Int down(Int n) {
                              if (n == 0) { return 0; }
                              return down(n - 1);
                          }
                      }
                      R r = new R();
                      return r.down(1000);";
        let table = orders();
        let query = Compiler::new()
            .with_max_call_depth(32)
            .compile("q", source, table.schema())
            .unwrap();
        let err = query.execute(&table).unwrap_err();
        assert!(matches!(err, ExecutionError::CallDepthExceeded { limit: 32 }), "{err:?}");

        let shallow = run(&source.replace("1000", "20")).unwrap();
        assert_eq!(values(&shallow), vec![Value::Int(0); 3]);
    }

    #[test]
    fn deep_recursion_fits_a_small_thread_stack() {
        let source = "class R {
                          Int down(Int n) {
                              if (n == 0) { return n; }
                              return down(n - 1) + 1;
                          }
                      }
                      R r = new R();
                      return r.down(DEPTH);";
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let table = orders();
                let default = Compiler::new()
                    .compile("q", &source.replace("DEPTH", "250"), table.schema())
                    .unwrap()
                    .execute(&table)
                    .unwrap();
                let ceiling = Compiler::new()
                    .with_max_call_depth(MAX_CALL_DEPTH_CEILING)
                    .compile("q", &source.replace("DEPTH", "4000"), table.schema())
                    .unwrap()
                    .execute(&table)
                    .unwrap();
                (values(&default), values(&ceiling))
            })
            .unwrap();
        let (default, ceiling) = handle.join().unwrap();
        assert_eq!(default, vec![Value::Int(250); 3]);
        assert_eq!(ceiling, vec![Value::Int(4000); 3]);
    }

    #[test]
    fn hundreds_of_locals() {
        let mut source: String = (0..300).map(|n| format!("Int x{n} = {n};\n")).collect();
        source.push_str("return x299 + x0;");
        let result = run(&source).unwrap();
        assert_eq!(values(&result), vec![Value::Int(299); 3]);
    }

    #[test]
    fn void_query_produces_no_rows() {
        let result = run("Int x = 1;").unwrap();
        assert!(result.is_empty());
    }
}
