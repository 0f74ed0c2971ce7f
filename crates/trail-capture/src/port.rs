use crate::detector::ChangeDetector;
use std::convert::Infallible;
use trail_core::RawEvent;

/// Inbound document notifications from a host (editor, watcher, CLI).
/// Independent of any particular editor framework.
pub trait DocumentEvents {
    type Error;

    /// A document was opened with `content`.
    fn on_open(&mut self, file: &str, content: &str);

    /// A document was saved with `content`. Returns the emitted `fileSave` event.
    fn on_save(&mut self, file: &str, language_id: &str, content: &str)
        -> Result<RawEvent, Self::Error>;

    /// A document was closed. Hosts that never send this rely on cache eviction.
    fn on_close(&mut self, file: &str);
}

impl DocumentEvents for ChangeDetector {
    type Error = Infallible;

    fn on_open(&mut self, file: &str, content: &str) {
        self.prime(file, content);
    }

    fn on_save(
        &mut self,
        file: &str,
        language_id: &str,
        content: &str,
    ) -> Result<RawEvent, Self::Error> {
        Ok(self.capture(file, language_id, content))
    }

    fn on_close(&mut self, file: &str) {
        self.forget(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::FixedBranch;
    use std::sync::Arc;

    fn drive<H: DocumentEvents>(host: &mut H) -> Result<RawEvent, H::Error> {
        host.on_open("notes.md", "# title\n");
        let event = host.on_save("notes.md", "markdown", "# title\nbody\n")?;
        host.on_close("notes.md");
        Ok(event)
    }

    #[test]
    fn detector_serves_as_document_port() {
        let mut det = ChangeDetector::new(4, Arc::new(FixedBranch::named("main")));
        let event = drive(&mut det).unwrap();
        assert_eq!(event.file_path.as_deref(), Some("notes.md"));
        assert!(!det.is_tracked("notes.md"));
    }
}
