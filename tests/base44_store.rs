// tests/base44_store.rs
//
// Backend legado: nomes de entidade, campos e timestamps diferentes.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use sanep_backend::{
    config::Backend,
    db::{Base44Store, Filter},
    entities::{Entities, Identifier},
    models::{enrollment::EnrollmentStatus, status::ActiveStatus},
};

fn entities(server: &MockServer) -> Entities {
    let store = Base44Store::new(&server.uri(), "app-sanep", "chave-base44").unwrap();
    Entities::single(Backend::Base44, Arc::new(store))
}

#[tokio::test]
async fn plans_are_read_through_the_field_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/app-sanep/entities/Plano"))
        .and(query_param("active", "true"))
        .and(header("api_key", "chave-base44"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "64f0c0ffee",
            "nome": "Plano Habitacional Básico",
            "valor_mensal": 150.0,
            "taxa_inscricao": 300.0,
            "active": true,
            "created_date": "2024-03-01T10:00:00.000",
            "updated_date": "2024-03-02T08:30:00.000"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let plans = entities(&server)
        .plans
        .filter(&Filter::new().eq("status", ActiveStatus::Active))
        .await
        .unwrap();

    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].status, ActiveStatus::Active);
    assert_eq!(
        plans[0].created_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn enrollment_updates_are_addressed_by_id() {
    let server = MockServer::start().await;
    let legacy_row = json!({
        "id": "insc-1",
        "nome": "João Souza",
        "cpf": "98765432100",
        "email": "joao@email.com",
        "plano_desejado_id": "64f0c0ffee",
        "status": "pendente",
        "created_date": "2024-03-01T10:00:00.000"
    });

    Mock::given(method("GET"))
        .and(path("/apps/app-sanep/entities/Inscricao"))
        .and(query_param("id", "insc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([legacy_row.clone()])))
        .mount(&server)
        .await;

    let mut updated_row = legacy_row.clone();
    updated_row["status"] = json!("rejeitado");
    updated_row["motivo_rejeicao"] = json!("Documentação incompleta");
    Mock::given(method("PUT"))
        .and(path("/apps/app-sanep/entities/Inscricao/insc-1"))
        .and(body_partial_json(json!({ "status": "rejeitado" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated_row))
        .expect(1)
        .mount(&server)
        .await;

    let enrollment = entities(&server)
        .enrollments
        .update(
            &Identifier::Id("insc-1".into()),
            &json!({ "status": "rejeitado", "motivo_rejeicao": "Documentação incompleta" }),
        )
        .await
        .unwrap();

    assert_eq!(enrollment.status, EnrollmentStatus::Rejeitado);
    assert_eq!(enrollment.nome_completo, "João Souza");
    assert_eq!(enrollment.plano_id, "64f0c0ffee");
}

#[tokio::test]
async fn created_rows_are_sent_with_native_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps/app-sanep/entities/Plano"))
        .and(body_partial_json(json!({ "nome": "Plano Novo", "active": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "novo",
            "nome": "Plano Novo",
            "valor_mensal": 10.0,
            "taxa_inscricao": 0.0,
            "active": false,
            "created_date": "2024-05-01T12:00:00.000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = entities(&server)
        .plans
        .create(&json!({
            "nome": "Plano Novo",
            "valor_mensal": 10.0,
            "taxa_inscricao": 0.0,
            "status": "inativo"
        }))
        .await
        .unwrap();

    assert_eq!(plan.status, ActiveStatus::Inactive);
    assert!(plan.updated_at.is_none());
}

#[tokio::test]
async fn schema_check_is_skipped() {
    let server = MockServer::start().await;
    let reports = entities(&server).verify_schema().await;
    assert!(reports.iter().all(|r| !r.is_problem()));
}
