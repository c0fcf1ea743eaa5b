use std::collections::BTreeMap;
use std::io::Write;

use eql_table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::error::ProtocolError;
use crate::header::MessageKind;
use crate::message::Message;

/// Look up an action by id.
///
/// Responds with the action as `{ id, name }`, or an empty map when the
/// table has no such action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetActionMessage {
    pub action_id: i64,
}

impl Message for GetActionMessage {
    const KIND: MessageKind = MessageKind::GetAction;

    fn process(&self, table: &mut dyn Table, output: &mut impl Write) -> Result<(), ProtocolError> {
        match table.action(self.action_id) {
            Some(action) => codec::encode(output, action)?,
            None => {
                debug!(table = table.name(), action_id = self.action_id, "action not found");
                codec::encode(output, &BTreeMap::<String, i64>::new())?
            }
        }
        Ok(())
    }
}
