//! Match workflow: a freelancer asks to join a project, the owning
//! organization accepts or rejects, and acceptance links the two users.
//!
//! Every operation runs inside a single transaction. Duplicate submissions are
//! absorbed by the unique constraints on `match_requests`, `connections` and
//! `project_collaborators` (`ON CONFLICT DO NOTHING`), and the status change is
//! a compare-and-set on `status = 'pending'` so only one decision ever commits.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::entities::{
    connection, match_request, prelude::*, profile, profile_skill, project, project_collaborator,
    project_skill, user,
};
use crate::db::enums::{MatchStatus, UserRole};
use crate::db::models::{Actor, MatchedProject, OrganizationMatchRequest};
use crate::db::services::ServiceError;
use crate::db::services::project_service::required_skill_names;

/// An organization's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchAction {
    Accept,
    Reject,
}

impl MatchAction {
    pub fn target_status(self) -> MatchStatus {
        match self {
            MatchAction::Accept => MatchStatus::Accepted,
            MatchAction::Reject => MatchStatus::Rejected,
        }
    }
}

fn require_role(actor: &Actor, role: UserRole, message: &str) -> Result<(), ServiceError> {
    if actor.role != role {
        warn!(user_id = actor.user_id, actual_role = %actor.role, required_role = %role, "Rejected wrong-role access.");
        return Err(ServiceError::Forbidden(message.to_string()));
    }
    Ok(())
}

pub(crate) async fn profile_of<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<profile::Model, ServiceError> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Profile for user {user_id} not found.")))
}

#[derive(Clone, Debug)]
pub struct MatchService {
    db: Arc<DatabaseConnection>,
}

impl MatchService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records the freelancer's interest in a project.
    ///
    /// Calling this again for the same project returns the existing request
    /// untouched, whatever its status.
    pub async fn request_match(
        &self,
        actor: &Actor,
        project_id: i32,
    ) -> Result<match_request::Model, ServiceError> {
        require_role(actor, UserRole::Freelancer, "Only freelancers can request a match.")?;

        let txn = self.db.begin().await?;

        let project = Project::find_by_id(project_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {project_id} not found.")))?;

        let own_profile = profile_of(&txn, actor.user_id).await?;
        if project.profile_id == own_profile.id {
            return Err(ServiceError::Forbidden(
                "You cannot request a match on your own project.".to_string(),
            ));
        }

        let new_request = match_request::ActiveModel {
            freelancer_id: Set(actor.user_id),
            project_id: Set(project_id),
            status: Set(MatchStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let inserted = MatchRequest::insert(new_request)
            .on_conflict(
                OnConflict::columns([
                    match_request::Column::FreelancerId,
                    match_request::Column::ProjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let request = MatchRequest::find()
            .filter(match_request::Column::FreelancerId.eq(actor.user_id))
            .filter(match_request::Column::ProjectId.eq(project_id))
            .one(&txn)
            .await?
            .ok_or(DbErr::RecordNotFound(format!(
                "match request for freelancer {} and project {project_id}",
                actor.user_id
            )))?;

        txn.commit().await?;

        if inserted > 0 {
            info!(request_id = request.id, freelancer_id = actor.user_id, project_id, "Created match request.");
        } else {
            debug!(request_id = request.id, status = %request.status, "Match request already exists, returning it unchanged.");
        }
        Ok(request)
    }

    /// Applies the owning organization's decision to a request.
    ///
    /// Only a pending request changes. A request that was already accepted or
    /// rejected is returned as it is, and its side effects are not replayed.
    pub async fn respond_to_match(
        &self,
        actor: &Actor,
        request_id: i32,
        action: MatchAction,
    ) -> Result<match_request::Model, ServiceError> {
        require_role(
            actor,
            UserRole::Organization,
            "Only organizations can respond to match requests.",
        )?;

        let txn = self.db.begin().await?;

        let owner_profile = profile_of(&txn, actor.user_id).await?;
        let found = MatchRequest::find_by_id(request_id)
            .find_also_related(Project)
            .one(&txn)
            .await?;

        // Requests on someone else's project are reported exactly like missing ones.
        let (request, project) = match found {
            Some((request, Some(project))) if project.profile_id == owner_profile.id => {
                (request, project)
            }
            _ => {
                return Err(ServiceError::NotFound(format!(
                    "Match request {request_id} not found."
                )));
            }
        };

        if request.status.is_decided() {
            txn.commit().await?;
            info!(request_id, status = %request.status, action = ?action, "Match request already decided, leaving it unchanged.");
            return Ok(request);
        }

        let new_status = action.target_status();
        let updated = MatchRequest::update_many()
            .col_expr(match_request::Column::Status, Expr::value(new_status))
            .filter(match_request::Column::Id.eq(request_id))
            .filter(match_request::Column::Status.eq(MatchStatus::Pending))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 1 && action == MatchAction::Accept {
            link_accepted_freelancer(&txn, request.freelancer_id, actor.user_id, project.id)
                .await?;
        }

        let request = MatchRequest::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Match request {request_id} not found.")))?;

        txn.commit().await?;

        if updated.rows_affected == 1 {
            info!(request_id, freelancer_id = request.freelancer_id, project_id = project.id, status = %request.status, "Match request decided.");
        } else {
            debug!(request_id, status = %request.status, "Match request was decided concurrently.");
        }
        Ok(request)
    }

    /// Projects sharing at least one skill with the freelancer, annotated with
    /// the freelancer's own request status. Projects owned by the freelancer's
    /// profile never appear.
    pub async fn list_matches_for_freelancer(
        &self,
        actor: &Actor,
    ) -> Result<Vec<MatchedProject>, ServiceError> {
        require_role(actor, UserRole::Freelancer, "Only freelancers can browse project matches.")?;

        let txn = self.db.begin().await?;
        let own_profile = profile_of(&txn, actor.user_id).await?;

        let skill_ids: Vec<i32> = ProfileSkill::find()
            .filter(profile_skill::Column::ProfileId.eq(own_profile.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|skill| skill.tag_id)
            .collect();
        if skill_ids.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let candidate_ids: Vec<i32> = ProjectSkill::find()
            .select_only()
            .column(project_skill::Column::ProjectId)
            .filter(project_skill::Column::TagId.is_in(skill_ids))
            .distinct()
            .into_tuple()
            .all(&txn)
            .await?;

        let projects = Project::find()
            .filter(project::Column::Id.is_in(candidate_ids))
            .filter(project::Column::ProfileId.ne(own_profile.id))
            .order_by_asc(project::Column::Id)
            .all(&txn)
            .await?;
        if projects.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let project_ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
        let owner_profile_ids: Vec<i32> = projects.iter().map(|p| p.profile_id).collect();

        let required_skills = required_skill_names(&txn, &project_ids).await?;

        let company_names: HashMap<i32, Option<String>> = Profile::find()
            .filter(profile::Column::Id.is_in(owner_profile_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p.company_name))
            .collect();

        let statuses: HashMap<i32, MatchStatus> = MatchRequest::find()
            .filter(match_request::Column::FreelancerId.eq(actor.user_id))
            .filter(match_request::Column::ProjectId.is_in(project_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| (r.project_id, r.status))
            .collect();

        txn.commit().await?;

        let matches = projects
            .into_iter()
            .map(|project| MatchedProject {
                required_skills: required_skills.get(&project.id).cloned().unwrap_or_default(),
                company_name: company_names.get(&project.profile_id).cloned().flatten(),
                match_status: statuses.get(&project.id).copied(),
                project,
            })
            .collect();
        Ok(matches)
    }

    /// All requests against the organization's projects, newest first.
    pub async fn list_matches_for_organization(
        &self,
        actor: &Actor,
    ) -> Result<Vec<OrganizationMatchRequest>, ServiceError> {
        require_role(
            actor,
            UserRole::Organization,
            "Only organizations can view incoming match requests.",
        )?;

        let txn = self.db.begin().await?;
        let own_profile = profile_of(&txn, actor.user_id).await?;

        let descriptions: HashMap<i32, String> = Project::find()
            .filter(project::Column::ProfileId.eq(own_profile.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p.description))
            .collect();
        if descriptions.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let rows: Vec<(match_request::Model, Option<user::Model>)> = MatchRequest::find()
            .filter(match_request::Column::ProjectId.is_in(descriptions.keys().copied()))
            .order_by_desc(match_request::Column::CreatedAt)
            .order_by_desc(match_request::Column::Id)
            .find_also_related(User)
            .all(&txn)
            .await?;

        txn.commit().await?;

        let requests = rows
            .into_iter()
            .map(|(request, freelancer)| {
                let (freelancer_email, freelancer_name) = freelancer
                    .map(|f| (f.email.clone(), f.full_name()))
                    .unwrap_or_default();
                OrganizationMatchRequest {
                    project_description: descriptions
                        .get(&request.project_id)
                        .cloned()
                        .unwrap_or_default(),
                    freelancer_email,
                    freelancer_name,
                    request,
                }
            })
            .collect();
        Ok(requests)
    }

    /// Removes the connection in both directions. Missing rows are fine.
    pub async fn remove_connection(&self, user_a: i32, user_b: i32) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;
        let result = Connection::delete_many()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(connection::Column::UserId.eq(user_a))
                            .add(connection::Column::ConnectedToId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(connection::Column::UserId.eq(user_b))
                            .add(connection::Column::ConnectedToId.eq(user_a)),
                    ),
            )
            .exec(&txn)
            .await?;
        txn.commit().await?;

        debug!(user_a, user_b, rows = result.rows_affected, "Removed connection.");
        Ok(result.rows_affected)
    }
}

/// Mutual connection plus collaborator entry. Each insert is a no-op when the
/// row already exists.
async fn link_accepted_freelancer(
    txn: &DatabaseTransaction,
    freelancer_id: i32,
    organization_id: i32,
    project_id: i32,
) -> Result<(), DbErr> {
    let now = Utc::now();
    let edges = [
        (freelancer_id, organization_id),
        (organization_id, freelancer_id),
    ]
    .map(|(from, to)| connection::ActiveModel {
        user_id: Set(from),
        connected_to_id: Set(to),
        created_at: Set(now),
    });
    Connection::insert_many(edges)
        .on_conflict(
            OnConflict::columns([
                connection::Column::UserId,
                connection::Column::ConnectedToId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

    ProjectCollaborator::insert(project_collaborator::ActiveModel {
        project_id: Set(project_id),
        user_id: Set(freelancer_id),
    })
    .on_conflict(
        OnConflict::columns([
            project_collaborator::Column::ProjectId,
            project_collaborator::Column::UserId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_project, seed_user, set_skills, setup_db};

    struct Fixture {
        service: MatchService,
        db: Arc<DatabaseConnection>,
        freelancer: Actor,
        organization: Actor,
        project: project::Model,
    }

    /// F1 knows Python; O1 owns P1 requiring Python and React.
    async fn fixture() -> Fixture {
        let db = Arc::new(setup_db().await);
        let f1 = seed_user(&db, "f1@example.com", UserRole::Freelancer).await;
        let o1 = seed_user(&db, "o1@example.com", UserRole::Organization).await;
        set_skills(&db, f1.id, &["Python"]).await;
        let project = seed_project(&db, o1.id, &["Python", "React"]).await;

        Fixture {
            service: MatchService::new(db.clone()),
            db,
            freelancer: Actor::new(f1.id, UserRole::Freelancer),
            organization: Actor::new(o1.id, UserRole::Organization),
            project,
        }
    }

    async fn connection_rows(db: &DatabaseConnection) -> Vec<(i32, i32)> {
        let mut rows: Vec<(i32, i32)> = Connection::find()
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.user_id, c.connected_to_id))
            .collect();
        rows.sort();
        rows
    }

    async fn collaborator_ids(db: &DatabaseConnection, project_id: i32) -> Vec<i32> {
        ProjectCollaborator::find()
            .filter(project_collaborator::Column::ProjectId.eq(project_id))
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.user_id)
            .collect()
    }

    #[tokio::test]
    async fn test_request_match_twice_keeps_a_single_pending_request() {
        let fx = fixture().await;

        let first = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        let second = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, MatchStatus::Pending);
        assert_eq!(MatchRequest::find().all(fx.db.as_ref()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_request_match_does_not_reset_a_decided_request() {
        let fx = fixture().await;
        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        fx.service
            .respond_to_match(&fx.organization, request.id, MatchAction::Reject)
            .await
            .unwrap();

        let again = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        assert_eq!(again.id, request.id);
        assert_eq!(again.status, MatchStatus::Rejected);
    }

    #[tokio::test]
    async fn test_request_match_rejects_organizations_and_unknown_projects() {
        let fx = fixture().await;

        let wrong_role = fx.service.request_match(&fx.organization, fx.project.id).await;
        assert!(matches!(wrong_role, Err(ServiceError::Forbidden(_))));

        let missing = fx.service.request_match(&fx.freelancer, 9_999).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        assert!(MatchRequest::find().all(fx.db.as_ref()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_match_on_own_project_is_forbidden() {
        let fx = fixture().await;
        let own = seed_project(&fx.db, fx.freelancer.user_id, &["Python"]).await;

        let result = fx.service.request_match(&fx.freelancer, own.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_creates_mutual_connection_and_collaborator_once() {
        let fx = fixture().await;
        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();

        for _ in 0..3 {
            let decided = fx
                .service
                .respond_to_match(&fx.organization, request.id, MatchAction::Accept)
                .await
                .unwrap();
            assert_eq!(decided.status, MatchStatus::Accepted);
        }

        let f = fx.freelancer.user_id;
        let o = fx.organization.user_id;
        let mut expected = vec![(f, o), (o, f)];
        expected.sort();
        assert_eq!(connection_rows(&fx.db).await, expected);
        assert_eq!(collaborator_ids(&fx.db, fx.project.id).await, vec![f]);
    }

    #[tokio::test]
    async fn test_accept_keeps_connections_that_already_exist() {
        let fx = fixture().await;
        let f = fx.freelancer.user_id;
        let o = fx.organization.user_id;
        connection::ActiveModel {
            user_id: Set(f),
            connected_to_id: Set(o),
            created_at: Set(Utc::now()),
        }
        .insert(fx.db.as_ref())
        .await
        .unwrap();

        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        fx.service
            .respond_to_match(&fx.organization, request.id, MatchAction::Accept)
            .await
            .unwrap();

        assert_eq!(connection_rows(&fx.db).await.len(), 2);
    }

    #[tokio::test]
    async fn test_reject_creates_no_connection_or_collaborator() {
        let fx = fixture().await;
        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();

        let decided = fx
            .service
            .respond_to_match(&fx.organization, request.id, MatchAction::Reject)
            .await
            .unwrap();

        assert_eq!(decided.status, MatchStatus::Rejected);
        assert!(connection_rows(&fx.db).await.is_empty());
        assert!(collaborator_ids(&fx.db, fx.project.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_decided_request_is_not_changed_by_a_second_response() {
        let fx = fixture().await;
        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        fx.service
            .respond_to_match(&fx.organization, request.id, MatchAction::Reject)
            .await
            .unwrap();

        let after = fx
            .service
            .respond_to_match(&fx.organization, request.id, MatchAction::Accept)
            .await
            .unwrap();

        assert_eq!(after.status, MatchStatus::Rejected);
        assert!(connection_rows(&fx.db).await.is_empty());
        assert!(collaborator_ids(&fx.db, fx.project.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_respond_by_non_owner_is_not_found_and_mutates_nothing() {
        let fx = fixture().await;
        let other_org = seed_user(&fx.db, "o2@example.com", UserRole::Organization).await;
        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();

        let result = fx
            .service
            .respond_to_match(
                &Actor::new(other_org.id, UserRole::Organization),
                request.id,
                MatchAction::Accept,
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let wrong_role = fx
            .service
            .respond_to_match(&fx.freelancer, request.id, MatchAction::Accept)
            .await;
        assert!(matches!(wrong_role, Err(ServiceError::Forbidden(_))));

        let stored = MatchRequest::find_by_id(request.id)
            .one(fx.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, MatchStatus::Pending);
        assert!(connection_rows(&fx.db).await.is_empty());
    }

    #[tokio::test]
    async fn test_full_scenario_from_browse_to_collaboration() {
        let fx = fixture().await;

        let before = fx.service.list_matches_for_freelancer(&fx.freelancer).await.unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].project.id, fx.project.id);
        assert_eq!(before[0].required_skills, vec!["Python".to_string(), "React".to_string()]);
        assert_eq!(before[0].match_status, None);

        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        let pending = fx.service.list_matches_for_freelancer(&fx.freelancer).await.unwrap();
        assert_eq!(pending[0].match_status, Some(MatchStatus::Pending));

        let accepted = fx
            .service
            .respond_to_match(&fx.organization, request.id, MatchAction::Accept)
            .await
            .unwrap();
        assert_eq!(accepted.status, MatchStatus::Accepted);

        let after = fx.service.list_matches_for_freelancer(&fx.freelancer).await.unwrap();
        assert_eq!(after[0].match_status, Some(MatchStatus::Accepted));
        assert_eq!(collaborator_ids(&fx.db, fx.project.id).await, vec![fx.freelancer.user_id]);
        assert_eq!(connection_rows(&fx.db).await.len(), 2);
    }

    #[tokio::test]
    async fn test_freelancer_matches_exclude_own_and_unrelated_projects() {
        let fx = fixture().await;
        seed_project(&fx.db, fx.freelancer.user_id, &["Python"]).await;
        seed_project(&fx.db, fx.organization.user_id, &["Haskell"]).await;

        let matches = fx.service.list_matches_for_freelancer(&fx.freelancer).await.unwrap();
        let ids: Vec<i32> = matches.iter().map(|m| m.project.id).collect();
        assert_eq!(ids, vec![fx.project.id]);
    }

    #[tokio::test]
    async fn test_freelancer_without_skills_has_no_matches() {
        let fx = fixture().await;
        let newcomer = seed_user(&fx.db, "new@example.com", UserRole::Freelancer).await;

        let matches = fx
            .service
            .list_matches_for_freelancer(&Actor::new(newcomer.id, UserRole::Freelancer))
            .await
            .unwrap();
        assert!(matches.is_empty());

        let wrong_role = fx.service.list_matches_for_freelancer(&fx.organization).await;
        assert!(matches!(wrong_role, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_organization_requests_are_newest_first_and_scoped() {
        let fx = fixture().await;
        let f2 = seed_user(&fx.db, "f2@example.com", UserRole::Freelancer).await;
        let f2_actor = Actor::new(f2.id, UserRole::Freelancer);
        let other_org = seed_user(&fx.db, "o2@example.com", UserRole::Organization).await;
        let foreign_project = seed_project(&fx.db, other_org.id, &["Python"]).await;

        let older = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        let newer = fx.service.request_match(&f2_actor, fx.project.id).await.unwrap();
        fx.service.request_match(&fx.freelancer, foreign_project.id).await.unwrap();

        let listed = fx.service.list_matches_for_organization(&fx.organization).await.unwrap();
        let ids: Vec<i32> = listed.iter().map(|r| r.request.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(listed[0].freelancer_email, "f2@example.com");
        assert_eq!(listed[1].project_description, fx.project.description);

        let wrong_role = fx.service.list_matches_for_organization(&fx.freelancer).await;
        assert!(matches!(wrong_role, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_remove_connection_deletes_both_directions_and_tolerates_absence() {
        let fx = fixture().await;
        let f = fx.freelancer.user_id;
        let o = fx.organization.user_id;

        assert_eq!(fx.service.remove_connection(f, o).await.unwrap(), 0);

        let request = fx.service.request_match(&fx.freelancer, fx.project.id).await.unwrap();
        fx.service
            .respond_to_match(&fx.organization, request.id, MatchAction::Accept)
            .await
            .unwrap();

        assert_eq!(fx.service.remove_connection(o, f).await.unwrap(), 2);
        assert!(connection_rows(&fx.db).await.is_empty());
        assert_eq!(fx.service.remove_connection(f, o).await.unwrap(), 0);
    }
}
