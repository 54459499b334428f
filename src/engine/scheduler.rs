use std::collections::BTreeMap;

/*
Timeline
========

An ordered list of cues, each pinned to an absolute sample frame:

    frame:   0        72000      144000     216000
             │          │          │          │
    cues:   Start(1)  Timer      Timer      Timer
                      Stop(1)    Stop(2)
                      ...

Cues at the same frame keep the order they were scheduled in; a `CueId` is
(frame, sequence number), so BTreeMap ordering gives exactly that.

Firing is pull-based. The renderer asks for everything due at or before
the current frame, handles it, renders up to `next_frame()`, and repeats.
Cancelling is just removing an entry that has not fired yet.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CueId {
    frame: u64,
    seq: u64,
}

impl CueId {
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[derive(Debug, Clone)]
pub struct Timeline<E> {
    cues: BTreeMap<CueId, E>,
    next_seq: u64,
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self {
            cues: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, frame: u64, event: E) -> CueId {
        let id = CueId {
            frame,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.cues.insert(id, event);
        id
    }

    /// Remove a cue that has not fired yet.
    pub fn cancel(&mut self, id: CueId) -> Option<E> {
        self.cues.remove(&id)
    }

    pub fn contains(&self, id: CueId) -> bool {
        self.cues.contains_key(&id)
    }

    /// Frame of the earliest pending cue.
    pub fn next_frame(&self) -> Option<u64> {
        self.cues.keys().next().map(|id| id.frame)
    }

    /// Take the earliest cue if it is due at `frame`.
    pub fn pop_due(&mut self, frame: u64) -> Option<(CueId, E)> {
        if self.next_frame()? <= frame {
            self.cues.pop_first()
        } else {
            None
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&CueId, &E) -> bool) {
        self.cues.retain(|id, event| keep(id, event));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CueId, &E)> {
        self.cues.iter()
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_frame_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(300, "c");
        timeline.schedule(100, "a");
        timeline.schedule(200, "b");

        assert_eq!(timeline.next_frame(), Some(100));
        let order: Vec<_> = std::iter::from_fn(|| timeline.pop_due(u64::MAX))
            .map(|(_, e)| e)
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn same_frame_keeps_schedule_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(50, 1);
        timeline.schedule(50, 2);
        timeline.schedule(50, 3);

        let order: Vec<_> = std::iter::from_fn(|| timeline.pop_due(50))
            .map(|(_, e)| e)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn nothing_due_before_its_frame() {
        let mut timeline = Timeline::new();
        timeline.schedule(10, ());
        assert!(timeline.pop_due(9).is_none());
        assert!(timeline.pop_due(10).is_some());
        assert!(timeline.is_empty());
    }

    #[test]
    fn cancelled_cue_never_fires() {
        let mut timeline = Timeline::new();
        let keep = timeline.schedule(10, "keep");
        let drop = timeline.schedule(5, "drop");

        assert_eq!(timeline.cancel(drop), Some("drop"));
        assert_eq!(timeline.cancel(drop), None);
        assert!(timeline.contains(keep));
        assert_eq!(timeline.pop_due(100).map(|(_, e)| e), Some("keep"));
    }

    #[test]
    fn retain_filters_pending() {
        let mut timeline = Timeline::new();
        for frame in 0..10u64 {
            timeline.schedule(frame, frame);
        }
        timeline.retain(|_, &e| e % 2 == 0);
        assert_eq!(timeline.len(), 5);
    }
}
