//! Ordered note sequences and active-note lookup.

use alloc::vec::Vec;

use crate::note::Note;

/// An immutable sequence of notes installed for playback.
///
/// Lookup returns the *first* note (in sequence order) whose interval
/// contains the query time. When notes are sorted by start time the
/// timeline keeps a running maximum of end times so lookup is a pair of
/// binary searches plus a short scan; otherwise it falls back to a
/// linear scan. Both paths return the same note.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    notes: Vec<Note>,
    /// `reach[i] = max(end_time[0..=i])`, present only for sorted timelines.
    reach: Option<Vec<f64>>,
}

impl Timeline {
    /// Build a timeline, indexing it when start times are non-decreasing.
    pub fn new(notes: Vec<Note>) -> Self {
        let sorted = notes
            .windows(2)
            .all(|pair| pair[0].start_time <= pair[1].start_time);

        let reach = if sorted {
            let mut reach = Vec::with_capacity(notes.len());
            let mut max_end = f64::NEG_INFINITY;
            for note in &notes {
                max_end = max_end.max(note.end_time);
                reach.push(max_end);
            }
            Some(reach)
        } else {
            None
        };

        Self { notes, reach }
    }

    /// An empty timeline (nothing ever sounds).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns true if lookups use the sorted index.
    pub fn is_indexed(&self) -> bool {
        self.reach.is_some()
    }

    /// Latest end time of any note, or 0 for an empty timeline.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(|n| n.end_time).fold(0.0, f64::max)
    }

    /// Find the first note active at `time`.
    pub fn active_at(&self, time: f64) -> Option<&Note> {
        match &self.reach {
            Some(reach) => {
                let upper = self.notes.partition_point(|n| n.start_time <= time);
                let lower = reach.partition_point(|&end| end <= time);
                if lower >= upper {
                    return None;
                }
                self.notes[lower..upper].iter().find(|n| n.contains(time))
            }
            None => self.scan(time),
        }
    }

    fn scan(&self, time: f64) -> Option<&Note> {
        self.notes.iter().find(|n| n.contains(time))
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }
}

impl From<Vec<Note>> for Timeline {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}
