/// Inline-edit state: at most one task title is being drafted at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing { id: String, draft: String },
}

impl EditMode {
    /// Identifier of the task being edited
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Viewing => None,
            Self::Editing { id, .. } => Some(id),
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Viewing => None,
            Self::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_id() == Some(id)
    }

    /// Enter edit mode for `id`, seeding the draft from `title`.
    ///
    /// Any other edit in progress is cancelled; its id is returned.
    pub(crate) fn begin(&mut self, id: &str, title: &str) -> Option<String> {
        let previous = match std::mem::take(self) {
            Self::Editing { id: prev, .. } if prev != id => Some(prev),
            _ => None,
        };
        *self = Self::Editing {
            id: id.to_string(),
            draft: title.to_string(),
        };
        previous
    }

    /// Replace the draft text. Returns false when nothing is being edited.
    pub(crate) fn set_draft(&mut self, text: &str) -> bool {
        match self {
            Self::Viewing => false,
            Self::Editing { draft, .. } => {
                text.clone_into(draft);
                true
            }
        }
    }

    /// Leave edit mode, discarding the draft. Returns the id that was being edited.
    pub(crate) fn cancel(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Viewing => None,
            Self::Editing { id, .. } => Some(id),
        }
    }

    /// Leave edit mode only if `id` is the task being edited.
    pub(crate) fn finish(&mut self, id: &str) -> bool {
        if self.is_editing(id) {
            *self = Self::Viewing;
            true
        } else {
            false
        }
    }
}
