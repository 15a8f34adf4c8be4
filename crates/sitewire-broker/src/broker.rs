//! The message broker: binding to the UI-owned state, the current-project
//! pointer, and the mutation entry points.
//!
//! Invariants upheld here:
//! - exactly one `apply` invocation per successful mutation, none on failure;
//! - replacement snapshots share every untouched `Arc` with the previous
//!   snapshot, so only the mutated channel (and its project) change identity;
//! - message logs only grow.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use sitewire_shared::model::{Channel, Message, PhotoReport, Project};
use sitewire_shared::types::{ChannelId, ChannelKind, ProjectId};

use crate::error::BrokerError;

/// Immutable snapshot of the whole project collection.
pub type ProjectsSnapshot = Arc<Vec<Arc<Project>>>;

/// Acceptor for a replaced collection, supplied by the state owner.
type ApplyFn = Box<dyn Fn(ProjectsSnapshot) + Send + Sync>;

struct BoundState {
    projects: ProjectsSnapshot,
    apply: ApplyFn,
}

/// Sole authority for reading and mutating the shared project collection.
///
/// Constructed once by the composition root and injected as
/// `Arc<MessageBroker>` into every producer and consumer.  The
/// current-project pointer is a watch channel: its owner pushes changes and
/// interested surfaces subscribe instead of polling.
pub struct MessageBroker {
    state: Mutex<Option<BoundState>>,
    current: watch::Sender<Option<ProjectId>>,
}

impl MessageBroker {
    /// Create a broker with no bound state.  Mutations fail with
    /// [`BrokerError::NotRegistered`] until [`register_state`] is called.
    ///
    /// [`register_state`]: MessageBroker::register_state
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            state: Mutex::new(None),
            current,
        }
    }

    /// Create a broker bound to its state at construction time.  This is the
    /// normal path for a composition root that owns the collection for the
    /// whole process lifetime.
    pub fn with_state(
        projects: ProjectsSnapshot,
        apply: impl Fn(ProjectsSnapshot) + Send + Sync + 'static,
    ) -> Self {
        let broker = Self::new();
        broker.register_state(projects, apply);
        broker
    }

    /// Bind the broker to the live collection and the owner's replacement
    /// acceptor.  A later registration replaces the earlier binding; the
    /// owning surface must re-register whenever its state reference changes.
    pub fn register_state(
        &self,
        projects: ProjectsSnapshot,
        apply: impl Fn(ProjectsSnapshot) + Send + Sync + 'static,
    ) {
        info!(projects = projects.len(), "Project state registered");
        *self.lock_state() = Some(BoundState {
            projects,
            apply: Box::new(apply),
        });
    }

    /// Update the current-project pointer and notify subscribers.  The id is
    /// not validated; a stale id is recorded and later treated as not found.
    pub fn set_current_project(&self, project_id: Option<ProjectId>) {
        self.current.send_if_modified(|current| {
            if *current == project_id {
                return false;
            }
            debug!(project = ?project_id, "Current project changed");
            *current = project_id;
            true
        });
    }

    /// The current-project pointer, possibly unset.
    pub fn current_project(&self) -> Option<ProjectId> {
        *self.current.borrow()
    }

    /// Subscribe to current-project changes.
    pub fn watch_current_project(&self) -> watch::Receiver<Option<ProjectId>> {
        self.current.subscribe()
    }

    /// Read-only snapshot of the collection for diagnostics.  Empty when no
    /// state is bound.
    pub fn projects(&self) -> ProjectsSnapshot {
        self.lock_state()
            .as_ref()
            .map(|bound| bound.projects.clone())
            .unwrap_or_default()
    }

    /// Deliver a photo report to the channel of the given kind.
    ///
    /// The target project is the explicit `project_id` when given, otherwise
    /// the current-project pointer.  Any failure leaves the collection
    /// untouched and invokes no acceptor.  On success the report is embedded
    /// in a new system message appended to the target channel, and the owner
    /// receives exactly one replacement snapshot.
    pub fn post_photo_report(
        &self,
        channel_kind: ChannelKind,
        report: PhotoReport,
        project_id: Option<ProjectId>,
    ) -> Result<Arc<Message>, BrokerError> {
        let mut guard = self.lock_state();
        let bound = guard.as_mut().ok_or(BrokerError::NotRegistered)?;

        let target = project_id
            .or_else(|| *self.current.borrow())
            .ok_or(BrokerError::NoProjectSelected)?;

        let project = find_project(&bound.projects, target)?;
        let channel = project
            .channel_of_kind(channel_kind)
            .ok_or(BrokerError::ChannelNotFound {
                kind: channel_kind,
                project: target,
            })?;
        let channel_id = channel.id;

        let message = Arc::new(Message::photo_report(channel_id, report));
        let next = append_message(&bound.projects, target, channel_id, message.clone());
        replace(bound, next);

        info!(
            project = %target,
            channel = %channel_id,
            kind = %channel_kind,
            message = %message.id,
            "Photo report posted"
        );
        Ok(message)
    }

    /// Append a user text message to a channel.
    pub fn post_text(
        &self,
        project_id: ProjectId,
        channel_id: ChannelId,
        sender_id: &str,
        sender_name: &str,
        content: &str,
    ) -> Result<Arc<Message>, BrokerError> {
        let mut guard = self.lock_state();
        let bound = guard.as_mut().ok_or(BrokerError::NotRegistered)?;

        let project = find_project(&bound.projects, project_id)?;
        if project.channel(channel_id).is_none() {
            return Err(BrokerError::ChannelIdNotFound(channel_id));
        }

        let message = Arc::new(Message::text(channel_id, sender_id, sender_name, content)?);
        let next = append_message(&bound.projects, project_id, channel_id, message.clone());
        replace(bound, next);

        debug!(project = %project_id, channel = %channel_id, message = %message.id, "Message sent");
        Ok(message)
    }

    /// Create a project with the default channel set and append it to the
    /// collection.
    pub fn create_project(
        &self,
        name: &str,
        external_id: &str,
    ) -> Result<Arc<Project>, BrokerError> {
        let mut guard = self.lock_state();
        let bound = guard.as_mut().ok_or(BrokerError::NotRegistered)?;

        let project = Arc::new(Project::with_default_channels(name, external_id)?);

        let mut next: Vec<Arc<Project>> = bound.projects.iter().cloned().collect();
        next.push(project.clone());
        replace(bound, next);

        info!(project = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Create a custom channel in an existing project.
    pub fn create_channel(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Arc<Channel>, BrokerError> {
        let mut guard = self.lock_state();
        let bound = guard.as_mut().ok_or(BrokerError::NotRegistered)?;

        find_project(&bound.projects, project_id)?;
        let channel = Arc::new(Channel::new(name, ChannelKind::Custom)?);

        let next: Vec<Arc<Project>> = bound
            .projects
            .iter()
            .map(|p| {
                if p.id == project_id {
                    let mut project = (**p).clone();
                    project.channels.push(channel.clone());
                    Arc::new(project)
                } else {
                    p.clone()
                }
            })
            .collect();
        replace(bound, next);

        info!(project = %project_id, channel = %channel.id, name = %channel.name, "Channel created");
        Ok(channel)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<BoundState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn find_project(
    projects: &ProjectsSnapshot,
    id: ProjectId,
) -> Result<&Arc<Project>, BrokerError> {
    projects
        .iter()
        .find(|p| p.id == id)
        .ok_or(BrokerError::ProjectNotFound(id))
}

/// Build the replacement collection in which only the target channel's
/// message list gains `message`.  Every other project, channel and message
/// keeps its `Arc` identity.
fn append_message(
    projects: &ProjectsSnapshot,
    project_id: ProjectId,
    channel_id: ChannelId,
    message: Arc<Message>,
) -> Vec<Arc<Project>> {
    projects
        .iter()
        .map(|p| {
            if p.id != project_id {
                return p.clone();
            }
            let mut project = (**p).clone();
            project.channels = project
                .channels
                .iter()
                .map(|c| {
                    if c.id != channel_id {
                        return c.clone();
                    }
                    let mut channel = (**c).clone();
                    channel.messages.push(message.clone());
                    Arc::new(channel)
                })
                .collect();
            Arc::new(project)
        })
        .collect()
}

/// Install the replacement snapshot and hand it to the owner.  The single
/// write path for the collection.
fn replace(bound: &mut BoundState, next: Vec<Arc<Project>>) {
    let snapshot: ProjectsSnapshot = Arc::new(next);
    bound.projects = snapshot.clone();
    (bound.apply)(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use sitewire_shared::types::{ImageRef, MessageKind, ReportKind};
    use sitewire_shared::ModelError;

    fn report(project_id: Option<ProjectId>) -> PhotoReport {
        PhotoReport::new(
            ReportKind::Issue,
            ImageRef::new("file:///tmp/cap.jpg"),
            "Exposed rebar",
            "Severity: high",
            None,
            Some(0.9),
            project_id,
        )
    }

    fn snapshot(projects: Vec<Project>) -> ProjectsSnapshot {
        Arc::new(projects.into_iter().map(Arc::new).collect())
    }

    /// Broker bound to the given projects, plus a counter of acceptor calls.
    fn bound_broker(projects: Vec<Project>) -> (MessageBroker, Arc<AtomicUsize>) {
        let applied = Arc::new(AtomicUsize::new(0));
        let counter = applied.clone();
        let broker = MessageBroker::with_state(snapshot(projects), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (broker, applied)
    }

    #[test]
    fn test_unregistered_broker_rejects_post() {
        let broker = MessageBroker::new();
        let err = broker
            .post_photo_report(ChannelKind::Issues, report(None), None)
            .unwrap_err();
        assert_eq!(err, BrokerError::NotRegistered);
        assert!(broker.projects().is_empty());
    }

    #[test]
    fn test_unknown_project_is_noop() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let (broker, applied) = bound_broker(vec![p1]);

        let before = broker.projects();
        let missing = ProjectId::new();
        let err = broker
            .post_photo_report(ChannelKind::Issues, report(Some(missing)), Some(missing))
            .unwrap_err();

        assert_eq!(err, BrokerError::ProjectNotFound(missing));
        assert!(Arc::ptr_eq(&before, &broker.projects()));
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_project_selected_is_noop() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let (broker, applied) = bound_broker(vec![p1]);
        broker.set_current_project(None);

        let before = broker.projects();
        let err = broker
            .post_photo_report(ChannelKind::Updates, report(None), None)
            .unwrap_err();

        assert_eq!(err, BrokerError::NoProjectSelected);
        assert!(Arc::ptr_eq(&before, &broker.projects()));
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_channel_kind_is_noop() {
        let mut bare = Project::new("Riverside Tower", "PROJ-001").unwrap();
        bare.channels = vec![Arc::new(
            Channel::new("general", ChannelKind::General).unwrap(),
        )];
        let project_id = bare.id;
        let (broker, applied) = bound_broker(vec![bare]);

        let err = broker
            .post_photo_report(ChannelKind::Issues, report(Some(project_id)), Some(project_id))
            .unwrap_err();

        assert_eq!(
            err,
            BrokerError::ChannelNotFound {
                kind: ChannelKind::Issues,
                project: project_id,
            }
        );
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_post_appends_single_message() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let project_id = p1.id;
        let expected_channel = p1.channel_of_kind(ChannelKind::Issues).unwrap().id;
        let (broker, applied) = bound_broker(vec![p1]);

        let posted = report(Some(project_id));
        let message = broker
            .post_photo_report(ChannelKind::Issues, posted.clone(), Some(project_id))
            .unwrap();

        assert_eq!(applied.load(Ordering::SeqCst), 1);
        assert_eq!(message.kind, MessageKind::PhotoReport);
        assert_eq!(message.channel_id, expected_channel);
        assert_eq!(message.photo_report, Some(posted));

        let projects = broker.projects();
        let channel = projects[0].channel(expected_channel).unwrap();
        assert_eq!(channel.messages.len(), 1);
        assert!(Arc::ptr_eq(&channel.messages[0], &message));
    }

    #[test]
    fn test_untouched_siblings_keep_identity() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let p2 = Project::with_default_channels("Harbor Depot", "PROJ-002").unwrap();
        let p1_id = p1.id;
        let (broker, _) = bound_broker(vec![p1, p2]);

        let before = broker.projects();
        broker
            .post_photo_report(ChannelKind::Updates, report(Some(p1_id)), Some(p1_id))
            .unwrap();
        let after = broker.projects();

        // The sibling project is pointer-identical.
        assert!(Arc::ptr_eq(&before[1], &after[1]));
        // The mutated project is a fresh allocation...
        assert!(!Arc::ptr_eq(&before[0], &after[0]));
        // ...but its untouched channels are not.
        for (old, new) in before[0].channels.iter().zip(after[0].channels.iter()) {
            if new.kind == ChannelKind::Updates {
                assert!(!Arc::ptr_eq(old, new));
            } else {
                assert!(Arc::ptr_eq(old, new));
            }
        }
    }

    #[test]
    fn test_current_project_pointer_routes_post() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let p1_id = p1.id;
        let (broker, _) = bound_broker(vec![p1]);

        broker.set_current_project(Some(p1_id));
        let message = broker
            .post_photo_report(ChannelKind::Issues, report(Some(p1_id)), None)
            .unwrap();

        let projects = broker.projects();
        assert_eq!(
            projects[0].channel(message.channel_id).unwrap().messages.len(),
            1
        );
    }

    #[test]
    fn test_stale_pointer_is_not_found_later() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let (broker, _) = bound_broker(vec![p1]);

        // Recording an id that does not exist is allowed...
        let stale = ProjectId::new();
        broker.set_current_project(Some(stale));
        assert_eq!(broker.current_project(), Some(stale));

        // ...and surfaces as not-found at delivery time.
        let err = broker
            .post_photo_report(ChannelKind::Issues, report(None), None)
            .unwrap_err();
        assert_eq!(err, BrokerError::ProjectNotFound(stale));
    }

    #[test]
    fn test_watch_current_project_pushes_changes() {
        let broker = MessageBroker::new();
        let mut rx = broker.watch_current_project();
        assert_eq!(*rx.borrow_and_update(), None);

        let id = ProjectId::new();
        broker.set_current_project(Some(id));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(id));

        // Re-setting the same value does not wake subscribers.
        broker.set_current_project(Some(id));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_register_replaces_binding() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let p1_id = p1.id;
        let (broker, first_applied) = bound_broker(vec![p1]);

        let p2 = Project::with_default_channels("Harbor Depot", "PROJ-002").unwrap();
        let p2_id = p2.id;
        let second_applied = Arc::new(AtomicUsize::new(0));
        let counter = second_applied.clone();
        broker.register_state(snapshot(vec![p2]), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // The old collection is gone entirely.
        let err = broker
            .post_photo_report(ChannelKind::Issues, report(Some(p1_id)), Some(p1_id))
            .unwrap_err();
        assert_eq!(err, BrokerError::ProjectNotFound(p1_id));

        broker
            .post_photo_report(ChannelKind::Issues, report(Some(p2_id)), Some(p2_id))
            .unwrap();
        assert_eq!(first_applied.load(Ordering::SeqCst), 0);
        assert_eq!(second_applied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_project_appends() {
        let (broker, applied) = bound_broker(Vec::new());

        let project = broker.create_project("Riverside Tower", "PROJ-001").unwrap();
        assert_eq!(applied.load(Ordering::SeqCst), 1);
        assert_eq!(project.channels.len(), 3);

        let projects = broker.projects();
        assert_eq!(projects.len(), 1);
        assert!(Arc::ptr_eq(&projects[0], &project));

        assert_eq!(
            broker.create_project("  ", "PROJ-002").unwrap_err(),
            BrokerError::Validation(ModelError::EmptyProjectName)
        );
        assert_eq!(applied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_channel_appends_custom() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let p1_id = p1.id;
        let (broker, _) = bound_broker(vec![p1]);

        let channel = broker.create_channel(p1_id, " Site-Logistics ").unwrap();
        assert_eq!(channel.kind, ChannelKind::Custom);
        assert_eq!(channel.name, "site-logistics");

        let projects = broker.projects();
        assert_eq!(projects[0].channels.len(), 4);
        assert!(projects[0].channel(channel.id).is_some());
    }

    #[test]
    fn test_post_text_validates_and_appends() {
        let p1 = Project::with_default_channels("Riverside Tower", "PROJ-001").unwrap();
        let p1_id = p1.id;
        let general = p1.channel_of_kind(ChannelKind::General).unwrap().id;
        let (broker, applied) = bound_broker(vec![p1]);

        assert_eq!(
            broker
                .post_text(p1_id, general, "user1", "You", "   ")
                .unwrap_err(),
            BrokerError::Validation(ModelError::EmptyMessageContent)
        );
        assert_eq!(applied.load(Ordering::SeqCst), 0);

        let unknown = ChannelId::new();
        assert_eq!(
            broker
                .post_text(p1_id, unknown, "user1", "You", "hello")
                .unwrap_err(),
            BrokerError::ChannelIdNotFound(unknown)
        );

        let message = broker
            .post_text(p1_id, general, "user1", "You", " standup at 9 ")
            .unwrap();
        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(message.content, "standup at 9");
        assert_eq!(
            broker.projects()[0].channel(general).unwrap().messages.len(),
            1
        );
    }
}
