use super::journal::WALJournal;
use std::io;
use std::sync::Arc;

/// WAL recovery performs crash recovery by replaying WAL entries on database open.
///
/// This ensures that all committed transactions are applied to the main database,
/// even if the process crashed before a checkpoint could be performed.
pub(crate) struct WALRecovery {
    journal: Arc<WALJournal>,
}

impl WALRecovery {
    /// Creates a new WAL recovery instance.
    pub(crate) fn new(journal: Arc<WALJournal>) -> Self {
        Self { journal }
    }

    /// Performs crash recovery by replaying WAL entries.
    ///
    /// Returns the number of transactions recovered.
    ///
    /// This method:
    /// 1. Reads the WAL header to get the sequence range
    /// 2. Reads all entries from oldest_seq
    /// 3. Validates sequence numbers are monotonic
    /// 4. Returns valid entries for the caller to apply
    ///
    /// The caller is responsible for:
    /// - Applying entries to the database
    /// - Fsyncing the database
    /// - Truncating the WAL
    pub(crate) fn recover(&self) -> io::Result<usize> {
        // Read WAL header
        let header = self.journal.read_header()?;

        // If no entries, nothing to recover
        if header.latest_seq < header.oldest_seq {
            return Ok(0);
        }

        // Read all entries from oldest_seq
        let entries = self.journal.read_from(header.oldest_seq)?;

        // Validate sequence numbers are monotonic and within expected range
        let mut prev_seq = header.oldest_seq.saturating_sub(1);
        let mut valid_count = 0;

        for entry in &entries {
            // Check sequence number
            if entry.sequence != prev_seq + 1 {
                eprintln!(
                    "WAL sequence gap detected: expected {}, got {}",
                    prev_seq + 1,
                    entry.sequence
                );
                if entry.sequence <= header.latest_seq {
                    // Within range but out of order - corruption
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "WAL sequence corruption detected",
                    ));
                } else {
                    // Beyond latest_seq - partial write from crash, stop here
                    break;
                }
            }

            valid_count += 1;
            prev_seq = entry.sequence;
        }

        Ok(valid_count)
    }

    /// Gets all valid WAL entries for replay.
    ///
    /// This is separate from recover() to allow the caller to apply entries
    /// at their convenience.
    pub(crate) fn get_entries(&self) -> io::Result<Vec<super::entry::WALEntry>> {
        let header = self.journal.read_header()?;
        if header.latest_seq < header.oldest_seq {
            return Ok(vec![]);
        }
        self.journal.read_from(header.oldest_seq)
    }
}
