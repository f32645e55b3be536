//! Candidate member pool
//!
//! The pool holds every reflected member of one type (own and inherited)
//! that has not yet been accounted for. Rules remove members they have fully
//! interpreted so later rules do not reinterpret them. Removal is monotonic:
//! there is no way to put a member back.

use metamodel_types::{ReflectedMember, TypeKey};
use std::sync::Arc;

/// Index of a candidate within its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(usize);

impl CandidateId {
    /// Position in declaration order
    pub fn index(self) -> usize {
        self.0
    }
}

/// One reflected member plus the type that declared it
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Pool index
    pub id: CandidateId,
    /// The reflected member
    pub member: Arc<ReflectedMember>,
    /// Most-derived declaring type
    pub declared_by: TypeKey,
}

/// Shrinking set of not-yet-consumed members of one type
#[derive(Debug, Clone, Default)]
pub struct MemberPool {
    candidates: Vec<Candidate>,
    live: Vec<bool>,
    removed: usize,
}

impl MemberPool {
    /// Create a pool from members in declaration order
    pub fn new(members: impl IntoIterator<Item = (ReflectedMember, TypeKey)>) -> Self {
        let candidates: Vec<Candidate> = members
            .into_iter()
            .enumerate()
            .map(|(index, (member, declared_by))| Candidate {
                id: CandidateId(index),
                member: Arc::new(member),
                declared_by,
            })
            .collect();
        let live = vec![true; candidates.len()];
        Self {
            candidates,
            live,
            removed: 0,
        }
    }

    /// Whether the candidate is still unconsumed
    pub fn contains(&self, id: CandidateId) -> bool {
        self.live.get(id.0).copied().unwrap_or(false)
    }

    /// Consume a candidate. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: CandidateId) -> bool {
        match self.live.get_mut(id.0) {
            Some(alive) if *alive => {
                *alive = false;
                self.removed += 1;
                true
            }
            _ => false,
        }
    }

    /// A candidate by id, consumed or not
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id.0)
    }

    /// Unconsumed candidates in declaration order
    pub fn live(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(move |candidate| self.live[candidate.id.0])
    }

    /// Every candidate in declaration order, consumed or not
    pub fn all(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// First unconsumed candidate named `name`, optionally with a given arity
    pub fn find(&self, name: &str, arity: Option<usize>) -> Option<&Candidate> {
        self.live().find(|candidate| {
            candidate.member.name == name
                && arity.map_or(true, |arity| candidate.member.arity() == arity)
        })
    }

    /// Find and consume a candidate, returning its member
    pub fn take(&mut self, name: &str, arity: Option<usize>) -> Option<Arc<ReflectedMember>> {
        let (id, member) = {
            let candidate = self.find(name, arity)?;
            (candidate.id, Arc::clone(&candidate.member))
        };
        self.remove(id);
        Some(member)
    }

    /// Consume every unconsumed candidate matching `predicate`
    pub fn take_all(
        &mut self,
        mut predicate: impl FnMut(&ReflectedMember) -> bool,
    ) -> Vec<Arc<ReflectedMember>> {
        let matched: Vec<CandidateId> = self
            .live()
            .filter(|candidate| predicate(&candidate.member))
            .map(|candidate| candidate.id)
            .collect();
        matched
            .into_iter()
            .filter_map(|id| {
                self.remove(id);
                self.candidate(id).map(|candidate| Arc::clone(&candidate.member))
            })
            .collect()
    }

    /// Total number of candidates ever in the pool
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the pool started empty
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of unconsumed candidates
    pub fn live_count(&self) -> usize {
        self.candidates.len() - self.removed
    }

    /// Number of consumed candidates
    pub fn removed_count(&self) -> usize {
        self.removed
    }
}
