use ferroservo_clients::RecordSink;

use super::{Completed, ServoLoop};

impl ServoLoop<Completed> {
    /// Hands over the record sink
    pub fn into_sink(self) -> Option<Box<dyn RecordSink>> {
        self.controller.sink
    }
}
