use gram_core::models::FeedbackStatus;
use gram_core::AppError;
use serde::Serialize;

use crate::backend::{ApplicationBackend, FeedbackBackend, RecordBackend};
use crate::descriptor::{ContentDescriptor, ANNOUNCEMENT, AWARD, GALLERY, MEMBER, PROGRAM};

/// Item counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub announcements: usize,
    pub gallery: usize,
    pub awards: usize,
    pub members: usize,
    /// Pending feedback only
    pub feedback: usize,
    pub applications: usize,
    pub programs: usize,
}

fn count_or_zero(what: &str, result: Result<usize, AppError>) -> usize {
    result.unwrap_or_else(|e| {
        tracing::warn!(list = what, error = %e, "Dashboard count unavailable");
        0
    })
}

async fn count_records<B: RecordBackend>(
    backend: &B,
    descriptor: &ContentDescriptor,
) -> Result<usize, AppError> {
    backend.list(descriptor, &[]).await.map(|r| r.len())
}

/// Fetch every list concurrently. A list that fails counts as zero.
pub async fn load_stats<B>(backend: &B) -> DashboardStats
where
    B: RecordBackend + FeedbackBackend + ApplicationBackend,
{
    let (announcements, gallery, awards, members, feedback, applications, programs) = tokio::join!(
        count_records(backend, &ANNOUNCEMENT),
        count_records(backend, &GALLERY),
        count_records(backend, &AWARD),
        count_records(backend, &MEMBER),
        async {
            backend
                .list_feedback(Some(FeedbackStatus::Pending))
                .await
                .map(|f| f.len())
        },
        async { backend.list_applications().await.map(|a| a.len()) },
        count_records(backend, &PROGRAM),
    );

    let stats = DashboardStats {
        announcements: count_or_zero("announcements", announcements),
        gallery: count_or_zero("gallery", gallery),
        awards: count_or_zero("awards", awards),
        members: count_or_zero("members", members),
        feedback: count_or_zero("feedback", feedback),
        applications: count_or_zero("applications", applications),
        programs: count_or_zero("programs", programs),
    };
    tracing::debug!(?stats, "Dashboard stats loaded");
    stats
}
