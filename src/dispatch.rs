//! Usage dispatch
//!
//! [`BillingBackend`] is the seam to the external billing system: one submit
//! operation per record kind. [`UsageDispatcher`] routes an accepted
//! [`UsageRecord`] to the matching operation.

use serde::Serialize;
use std::io::Write;

use crate::error::DispatchError;
use crate::models::{CallRecord, InternetRecord, TextRecord, UsageRecord};

pub trait BillingBackend {
    fn submit_text_usage(&mut self, record: &TextRecord) -> Result<(), DispatchError>;
    fn submit_call_usage(&mut self, record: &CallRecord) -> Result<(), DispatchError>;
    fn submit_internet_usage(&mut self, record: &InternetRecord) -> Result<(), DispatchError>;

    /// Push buffered events to their destination.
    fn flush(&mut self) -> Result<(), DispatchError> {
        Ok(())
    }
}

pub struct UsageDispatcher<B: BillingBackend> {
    backend: B,
}

impl<B: BillingBackend> UsageDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn dispatch(&mut self, record: &UsageRecord) -> Result<(), DispatchError> {
        match record {
            UsageRecord::Text(r) => self.backend.submit_text_usage(r),
            UsageRecord::Call(r) => self.backend.submit_call_usage(r),
            UsageRecord::Internet(r) => self.backend.submit_internet_usage(r),
        }
    }

    pub fn flush(&mut self) -> Result<(), DispatchError> {
        self.backend.flush()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// Writes each accepted record as one JSON line, e.g.
/// `{"kind":"text","source_phone":"1234567890",...}`.
pub struct JsonlBillingSink<W: Write> {
    writer: W,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SinkEvent<'a> {
    Text(&'a TextRecord),
    Call(&'a CallRecord),
    Internet(&'a InternetRecord),
}

impl<W: Write> JsonlBillingSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: SinkEvent<'_>) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, &event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> BillingBackend for JsonlBillingSink<W> {
    fn submit_text_usage(&mut self, record: &TextRecord) -> Result<(), DispatchError> {
        self.write_event(SinkEvent::Text(record))
    }

    fn submit_call_usage(&mut self, record: &CallRecord) -> Result<(), DispatchError> {
        self.write_event(SinkEvent::Call(record))
    }

    fn submit_internet_usage(&mut self, record: &InternetRecord) -> Result<(), DispatchError> {
        self.write_event(SinkEvent::Internet(record))
    }

    fn flush(&mut self) -> Result<(), DispatchError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Accepts and drops every record. Used for dry runs.
#[derive(Debug, Default)]
pub struct DiscardBackend;

impl BillingBackend for DiscardBackend {
    fn submit_text_usage(&mut self, _record: &TextRecord) -> Result<(), DispatchError> {
        Ok(())
    }

    fn submit_call_usage(&mut self, _record: &CallRecord) -> Result<(), DispatchError> {
        Ok(())
    }

    fn submit_internet_usage(&mut self, _record: &InternetRecord) -> Result<(), DispatchError> {
        Ok(())
    }
}

impl<B: BillingBackend + ?Sized> BillingBackend for Box<B> {
    fn submit_text_usage(&mut self, record: &TextRecord) -> Result<(), DispatchError> {
        (**self).submit_text_usage(record)
    }

    fn submit_call_usage(&mut self, record: &CallRecord) -> Result<(), DispatchError> {
        (**self).submit_call_usage(record)
    }

    fn submit_internet_usage(&mut self, record: &InternetRecord) -> Result<(), DispatchError> {
        (**self).submit_internet_usage(record)
    }

    fn flush(&mut self) -> Result<(), DispatchError> {
        (**self).flush()
    }
}

impl<B: BillingBackend + ?Sized> BillingBackend for &mut B {
    fn submit_text_usage(&mut self, record: &TextRecord) -> Result<(), DispatchError> {
        (**self).submit_text_usage(record)
    }

    fn submit_call_usage(&mut self, record: &CallRecord) -> Result<(), DispatchError> {
        (**self).submit_call_usage(record)
    }

    fn submit_internet_usage(&mut self, record: &InternetRecord) -> Result<(), DispatchError> {
        (**self).submit_internet_usage(record)
    }

    fn flush(&mut self) -> Result<(), DispatchError> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;

    fn text_record() -> TextRecord {
        TextRecord {
            source_phone: "1234567890".into(),
            dest_phone: "9876543210".into(),
            sent_at: Timestamp::new(2024, 3, 1, 10, 15, 30).unwrap(),
            byte_count: 512,
        }
    }

    #[test]
    fn test_jsonl_sink_writes_one_line_per_record() {
        let mut dispatcher = UsageDispatcher::new(JsonlBillingSink::new(Vec::new()));
        dispatcher
            .dispatch(&UsageRecord::Text(text_record()))
            .unwrap();
        dispatcher
            .dispatch(&UsageRecord::Internet(InternetRecord {
                source_phone: "1234567890".into(),
                used_at: Timestamp::new(2024, 3, 1, 8, 0, 0).unwrap(),
                megabytes: 50,
            }))
            .unwrap();

        let output = String::from_utf8(dispatcher.into_backend().into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "text");
        assert_eq!(lines[0]["sent_at"], "2024-03-01;10:15:30");
        assert_eq!(lines[0]["byte_count"], 512);
        assert_eq!(lines[1]["kind"], "internet");
        assert_eq!(lines[1]["megabytes"], 50);
    }

    struct RejectingBackend;

    impl BillingBackend for RejectingBackend {
        fn submit_text_usage(&mut self, _record: &TextRecord) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected("plan suspended".into()))
        }

        fn submit_call_usage(&mut self, _record: &CallRecord) -> Result<(), DispatchError> {
            Ok(())
        }

        fn submit_internet_usage(&mut self, _record: &InternetRecord) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_failure_is_surfaced() {
        let mut dispatcher = UsageDispatcher::new(RejectingBackend);
        let err = dispatcher
            .dispatch(&UsageRecord::Text(text_record()))
            .unwrap_err();
        assert!(err.to_string().contains("plan suspended"));
    }
}
