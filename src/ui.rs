//! Client view state and its transitions.
//!
//! The whole UI state (filter, page, visible tasks, open modal, form contents,
//! pending error) is one serializable value. [`ViewState::apply`] is a pure
//! transition: it updates the state for an [`Event`] and returns the
//! [`Effect`] the front end must perform, if any. The result of that effect is
//! fed back as another event. Nothing is updated optimistically; the task list
//! only changes when a fetch succeeds.

use crate::types::{Status, Task, TaskPatch};
use serde::{Deserialize, Serialize};

/// Message shown when the form is submitted with blank fields.
pub const FORM_REQUIRED_MESSAGE: &str = "Title and description are required.";

/// Which tasks the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    /// The status sent to the server, `None` for all tasks.
    pub fn status(&self) -> Option<Status> {
        match self {
            Filter::All => None,
            Filter::Pending => Some(Status::Pending),
            Filter::Completed => Some(Status::Completed),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pending => "pending",
            Filter::Completed => "completed",
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" => Ok(Filter::Completed),
            other => Err(format!("unknown filter '{}': expected all, pending or completed", other)),
        }
    }
}

/// Whether a fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

/// What a submitted form will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Contents of the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(flatten)]
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub status: Status,
}

impl FormState {
    /// An empty form for a new task.
    pub fn blank() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            status: Status::Pending,
        }
    }

    /// A form pre-filled from an existing task.
    pub fn for_task(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit { id: task.id.clone() },
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
        }
    }

    fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// The dialog currently shown on top of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    Form(FormState),
    ConfirmDelete { id: String, title: String },
}

/// Everything the client shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub filter: Filter,
    pub page: u32,
    pub total_pages: u64,
    pub tasks: Vec<Task>,
    pub phase: Phase,
    pub modal: Option<Modal>,
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            page: 1,
            total_pages: 1,
            tasks: Vec::new(),
            phase: Phase::Idle,
            modal: None,
            error: None,
        }
    }
}

/// Something that happened: a user interaction or the result of an effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Refresh,
    SelectFilter(Filter),
    NextPage,
    PrevPage,
    GoToPage(u32),
    Loaded { tasks: Vec<Task>, total_pages: u64 },
    LoadFailed(String),
    OpenCreate,
    OpenEdit(Task),
    SetTitle(String),
    SetDescription(String),
    SetStatus(Status),
    SubmitForm,
    Saved(Task),
    SaveFailed(String),
    RequestDelete(Task),
    ConfirmDelete,
    Deleted,
    DeleteFailed(String),
    CloseModal,
    DismissError,
}

/// Work the front end must perform against the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { status: Option<Status>, page: u32 },
    Create { title: String, description: String, status: Status },
    Update { id: String, patch: TaskPatch },
    Delete { id: String },
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest page the user may move to.
    pub fn last_page(&self) -> u32 {
        u32::try_from(self.total_pages.max(1)).unwrap_or(u32::MAX)
    }

    pub fn form(&self) -> Option<&FormState> {
        match &self.modal {
            Some(Modal::Form(form)) => Some(form),
            _ => None,
        }
    }

    fn form_mut(&mut self) -> Option<&mut FormState> {
        match &mut self.modal {
            Some(Modal::Form(form)) => Some(form),
            _ => None,
        }
    }

    fn fetch(&mut self) -> Option<Effect> {
        self.phase = Phase::Loading;
        Some(Effect::Fetch {
            status: self.filter.status(),
            page: self.page,
        })
    }

    /// Apply one event and return the effect it requires, if any.
    pub fn apply(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::Refresh => self.fetch(),

            Event::SelectFilter(filter) => {
                self.filter = filter;
                self.page = 1;
                self.fetch()
            }

            Event::NextPage => {
                if self.page >= self.last_page() {
                    return None;
                }
                self.page += 1;
                self.fetch()
            }

            Event::PrevPage => {
                if self.page <= 1 {
                    return None;
                }
                self.page -= 1;
                self.fetch()
            }

            Event::GoToPage(page) => {
                self.page = page.clamp(1, self.last_page());
                self.fetch()
            }

            Event::Loaded { tasks, total_pages } => {
                self.total_pages = total_pages;
                // The current page disappeared (e.g. its last task was deleted)
                if tasks.is_empty() && self.page > self.last_page() {
                    self.page = self.last_page();
                    return self.fetch();
                }
                self.tasks = tasks;
                self.phase = Phase::Idle;
                None
            }

            Event::LoadFailed(message) => {
                self.phase = Phase::Idle;
                self.error = Some(message);
                None
            }

            Event::OpenCreate => {
                self.modal = Some(Modal::Form(FormState::blank()));
                None
            }

            Event::OpenEdit(task) => {
                self.modal = Some(Modal::Form(FormState::for_task(&task)));
                None
            }

            Event::SetTitle(title) => {
                if let Some(form) = self.form_mut() {
                    form.title = title;
                }
                None
            }

            Event::SetDescription(description) => {
                if let Some(form) = self.form_mut() {
                    form.description = description;
                }
                None
            }

            Event::SetStatus(status) => {
                if let Some(form) = self.form_mut() {
                    form.status = status;
                }
                None
            }

            Event::SubmitForm => {
                let form = self.form()?.clone();
                if !form.is_complete() {
                    self.error = Some(FORM_REQUIRED_MESSAGE.to_string());
                    return None;
                }
                match form.mode {
                    FormMode::Create => Some(Effect::Create {
                        title: form.title,
                        description: form.description,
                        status: form.status,
                    }),
                    FormMode::Edit { id } => Some(Effect::Update {
                        id,
                        patch: TaskPatch {
                            title: Some(form.title),
                            description: Some(form.description),
                            status: Some(form.status),
                        },
                    }),
                }
            }

            Event::Saved(_) => {
                self.modal = None;
                self.error = None;
                self.fetch()
            }

            Event::SaveFailed(message) => {
                self.error = Some(message);
                None
            }

            Event::RequestDelete(task) => {
                self.modal = Some(Modal::ConfirmDelete {
                    id: task.id,
                    title: task.title,
                });
                None
            }

            Event::ConfirmDelete => match &self.modal {
                Some(Modal::ConfirmDelete { id, .. }) => Some(Effect::Delete { id: id.clone() }),
                _ => None,
            },

            Event::Deleted => {
                self.modal = None;
                self.fetch()
            }

            Event::DeleteFailed(message) => {
                self.modal = None;
                self.error = Some(message);
                None
            }

            Event::CloseModal => {
                self.modal = None;
                None
            }

            Event::DismissError => {
                self.error = None;
                None
            }
        }
    }
}
