use compass_core::CompassError;
use compass_projects::{
    InMemoryProjectRepository, NewProject, ProjectRepository, RiskAssessment, RiskLevel,
};

fn assessment(risk: RiskLevel) -> Option<RiskAssessment> {
    Some(RiskAssessment {
        risk,
        reason: format!("classified as {risk}"),
    })
}

#[tokio::test]
async fn crud_lifecycle() {
    let repo = InMemoryProjectRepository::new();

    let first = repo
        .insert(
            NewProject::new("Hiring screener", "Ranks job applicants").with_market(["EU"]),
            assessment(RiskLevel::High),
        )
        .await
        .unwrap();
    let second = repo
        .insert(
            NewProject::new("Spam filter", "Filters inbound mail")
                .with_market(["EU", "US"])
                .with_attachment("uploads/spam-filter.pdf"),
            assessment(RiskLevel::Minimal),
        )
        .await
        .unwrap();

    assert_eq!((first.id, second.id), (1, 2));
    assert_eq!(repo.list().await.unwrap().len(), 2);

    let fetched = repo.get(2).await.unwrap();
    assert_eq!(fetched.eu_risk, Some(RiskLevel::Minimal));
    assert_eq!(fetched.eu_risk_reason.as_deref(), Some("classified as Minimal"));
    assert!(fetched.attachment.is_some());

    let renamed = repo.rename(1, "Applicant ranker").await.unwrap();
    assert_eq!(renamed.name, "Applicant ranker");
    assert_eq!(repo.get(1).await.unwrap().name, "Applicant ranker");

    repo.delete(1).await.unwrap();
    assert!(matches!(repo.get(1).await, Err(CompassError::ProjectNotFound(1))));
    assert!(matches!(repo.delete(1).await, Err(CompassError::ProjectNotFound(1))));

    // Ids are not reused after deletion.
    let third = repo
        .insert(NewProject::new("Translator", "Translates documents").with_market(["EU"]), None)
        .await
        .unwrap();
    assert_eq!(third.id, 3);
    assert_eq!(third.eu_risk, None);
}

#[tokio::test]
async fn rejects_incomplete_projects() {
    let repo = InMemoryProjectRepository::new();

    let err = repo
        .insert(NewProject::new("Nameless market", "Has no market"), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("market"));

    let err = repo.rename(42, "anything").await.unwrap_err();
    assert!(matches!(err, CompassError::ProjectNotFound(42)));

    assert!(repo.list().await.unwrap().is_empty());
}
