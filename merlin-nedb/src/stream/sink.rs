use crate::common::Document;
use crate::errors::AdapterError;

/// Destination of the records produced by `find` and `insert`.
///
/// Success protocol: any number of `write`s, then one `end`. `error` is
/// terminal; neither `write` nor `end` follow it.
pub trait RecordSink: Send {
    fn write(&mut self, record: Document);

    fn end(&mut self);

    fn error(&mut self, error: AdapterError);
}

/// Destination of the single number produced by `count`, `update` and
/// `remove`.
///
/// Success protocol: exactly one `write`, then `end`. `error` is terminal.
pub trait CountSink: Send {
    fn write(&mut self, count: u64);

    fn end(&mut self);

    fn error(&mut self, error: AdapterError);
}
