//! JSON 投影：`{"type":"Buffer","data":[104,105]}`（对应 `buf.toJSON()`）。

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::buffer::Buffer;

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.to_vec();
        let mut state = serializer.serialize_struct("Buffer", 2)?;
        state.serialize_field("type", "Buffer")?;
        state.serialize_field("data", &data)?;
        state.end()
    }
}
