// tests/adapter_contract.rs
//
// O contrato do adaptador, exercitado contra o banco em memória com as
// mesmas restrições do Supabase.

use std::fmt::Debug;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use sanep_backend::{
    common::error::AppError,
    config::Backend,
    db::{Filter, MemoryStore, RemoteError, RemoteStore},
    entities::{Entities, Entity, EntityAdapter, Identifier},
    models::{
        enrollment::EnrollmentStatus,
        member::{NewCredential, NewMember},
        plan::Plan,
        status::ActiveStatus,
    },
};

async fn seed_plan(entities: &Entities) -> Plan {
    entities
        .plans
        .create(&json!({
            "nome": "Plano Habitacional Básico",
            "descricao": "Parcelas mensais",
            "valor_mensal": 150.0,
            "taxa_inscricao": 300.0,
            "status": "ativo"
        }))
        .await
        .unwrap()
}

fn new_member(numero: &str, cpf: &str) -> NewMember {
    NewMember {
        numero_associado: numero.to_string(),
        nome_completo: "Maria da Silva".to_string(),
        cpf: cpf.to_string(),
        email: "maria@email.com".to_string(),
        telefone: None,
        data_nascimento: None,
        endereco: None,
        cidade: Some("Pelotas".to_string()),
        estado: Some("RS".to_string()),
        cep: None,
        plano_id: None,
        status: ActiveStatus::Active,
        data_adesao: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

#[tokio::test]
async fn create_returns_row_with_generated_fields() {
    let entities = Entities::in_memory();
    let plan = seed_plan(&entities).await;

    assert!(!plan.id.is_empty());
    assert_eq!(plan.nome, "Plano Habitacional Básico");
    assert_eq!(plan.valor_mensal, Decimal::new(150, 0));
    assert_eq!(plan.status, ActiveStatus::Active);
}

#[tokio::test]
async fn filter_by_id_returns_exactly_the_row() {
    let entities = Entities::in_memory();
    let plan = seed_plan(&entities).await;
    seed_plan(&entities).await;

    let rows = entities.plans.filter(&Filter::by_id(&plan.id)).await.unwrap();
    assert_eq!(rows, vec![plan]);
}

#[tokio::test]
async fn update_changes_only_the_given_field() {
    let entities = Entities::in_memory();
    let plan = seed_plan(&entities).await;

    let updated = entities
        .plans
        .update(&Identifier::Id(plan.id.clone()), &json!({ "nome": "Plano Premium" }))
        .await
        .unwrap();
    assert_eq!(updated.nome, "Plano Premium");

    let reread = entities.plans.find_by_id(&plan.id).await.unwrap().unwrap();
    assert_eq!(reread.nome, "Plano Premium");
    assert_eq!(reread.descricao, plan.descricao);
    assert_eq!(reread.taxa_inscricao, plan.taxa_inscricao);
    assert_eq!(reread.created_at, plan.created_at);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let entities = Entities::in_memory();
    let plan = seed_plan(&entities).await;

    entities.plans.delete(&plan.id).await.unwrap();
    assert!(entities.plans.filter(&Filter::by_id(&plan.id)).await.unwrap().is_empty());

    // Zero linhas afetadas nunca é sucesso
    let again = entities.plans.delete(&plan.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let entities = Entities::in_memory();
    let result = entities
        .plans
        .update(&Identifier::Id("nao-existe".into()), &json!({ "nome": "X" }))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn empty_filter_equals_list() {
    let entities = Entities::in_memory();
    seed_plan(&entities).await;
    seed_plan(&entities).await;

    let all = entities.plans.list().await.unwrap();
    let filtered = entities.plans.filter(&Filter::new()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all, filtered);
}

#[tokio::test]
async fn member_login_lookup_finds_exactly_one_credential() {
    let entities = Entities::in_memory();
    let member = entities
        .members
        .create(&new_member("CS000001", "12345678900"))
        .await
        .unwrap();

    let credential = NewCredential {
        cooperado_id: member.id.clone(),
        email: member.email.clone(),
        password_hash: "$2b$04$hash".to_string(),
        status: ActiveStatus::Active,
    };
    entities.credentials.create(&credential).await.unwrap();

    let found = entities
        .members
        .filter(
            &Filter::new()
                .eq("numero_associado", "CS000001")
                .eq("status", ActiveStatus::Active),
        )
        .await
        .unwrap();
    assert_eq!(found, vec![member.clone()]);

    let by_member = Filter::new().eq("cooperado_id", member.id.as_str());
    let credentials = entities.credentials.filter(&by_member).await.unwrap();
    assert_eq!(credentials.len(), 1);

    // A segunda credencial esbarra na UNIQUE (cooperado_id)
    let duplicate = NewCredential { email: "outro@email.com".into(), ..credential };
    let err = entities.credentials.create(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::Remote(RemoteError::Conflict(_))));
}

#[tokio::test]
async fn find_unique_refuses_to_pick_between_duplicates() {
    // Banco permissivo, sem UNIQUE
    let entities = Entities::single(Backend::Memory, Arc::new(MemoryStore::new()));
    for email in ["a@email.com", "b@email.com"] {
        entities
            .credentials
            .create(&NewCredential {
                cooperado_id: "m1".into(),
                email: email.into(),
                password_hash: "$2b$04$hash".into(),
                status: ActiveStatus::Active,
            })
            .await
            .unwrap();
    }

    let result = entities
        .credentials
        .find_unique(&Filter::new().eq("cooperado_id", "m1"))
        .await;
    assert!(matches!(result, Err(AppError::DuplicateRecord(_))));

    let first = entities
        .credentials
        .find_one(&Filter::new().eq("cooperado_id", "m1"))
        .await
        .unwrap();
    assert!(first.is_some());
}

#[tokio::test]
async fn out_of_domain_status_is_refused_before_writing() {
    // Com e sem CHECK no banco, o resultado é o mesmo
    for store in [MemoryStore::with_default_constraints(), MemoryStore::new()] {
        let store = Arc::new(store);
        let entities = Entities::single(Backend::Memory, store.clone());
        let plan = seed_plan(&entities).await;
        let enrollment = entities
            .enrollments
            .create(&json!({
                "nome_completo": "João Souza",
                "cpf": "98765432100",
                "email": "joao@email.com",
                "plano_id": plan.id,
                "status": "pendente"
            }))
            .await
            .unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Pendente);

        let result = entities
            .enrollments
            .update(&Identifier::Id(enrollment.id.clone()), &json!({ "status": "aprovada" }))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        // Nada foi gravado e a tabela continua legível
        let raw = store
            .select("inscricoes_publicas", &Filter::by_id(&enrollment.id))
            .await
            .unwrap();
        assert_eq!(raw[0]["status"], json!("pendente"));
        let all = entities.enrollments.list().await.unwrap();
        assert_eq!(all, vec![enrollment]);
    }
}

#[tokio::test]
async fn out_of_domain_create_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let entities = Entities::single(Backend::Memory, store.clone());
    let result = entities
        .plans
        .create(&json!({
            "nome": "Estranho",
            "valor_mensal": 1.0,
            "taxa_inscricao": 1.0,
            "status": "suspenso"
        }))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.row_count("planos").await, 0);
}

#[tokio::test]
async fn omitted_columns_with_database_defaults_are_accepted() {
    // `status` e `taxa_inscricao` têm DEFAULT no banco; o backend completa a linha
    let store = Arc::new(MemoryStore::new());
    let entities = Entities::single(Backend::Memory, store.clone());
    let result = entities
        .plans
        .create(&json!({ "nome": "Sem status", "valor_mensal": 10.0 }))
        .await;

    // O banco em memória não aplica DEFAULT, então a linha devolvida não fecha;
    // o que importa é que a checagem prévia deixou a escrita passar.
    assert!(matches!(result, Err(AppError::InvalidRecord(_))));
    assert_eq!(store.row_count("planos").await, 1);
}

#[tokio::test]
async fn rows_written_outside_the_adapter_surface_as_invalid_records() {
    // Outro sistema gravou direto no banco, sem CHECK
    let store = Arc::new(MemoryStore::new());
    let entities = Entities::single(Backend::Memory, store.clone());
    let raw = json!({
        "nome": "Estranho",
        "valor_mensal": 1.0,
        "taxa_inscricao": 1.0,
        "status": "suspenso"
    });
    store
        .insert("planos", raw.as_object().cloned().unwrap())
        .await
        .unwrap();

    let result = entities.plans.list().await;
    assert!(matches!(result, Err(AppError::InvalidRecord(_))));
}

#[tokio::test]
async fn natural_key_updates_resolve_the_row_first() {
    let entities = Entities::in_memory();
    let member = entities
        .members
        .create(&new_member("CS000002", "11122233344"))
        .await
        .unwrap();
    entities
        .credentials
        .create(&NewCredential {
            cooperado_id: member.id.clone(),
            email: "maria@email.com".into(),
            password_hash: "antigo".into(),
            status: ActiveStatus::Active,
        })
        .await
        .unwrap();

    let updated = entities
        .credentials
        .update(
            &Identifier::NaturalKey("maria@email.com".into()),
            &json!({ "password_hash": "novo" }),
        )
        .await
        .unwrap();
    assert_eq!(updated.password_hash, "novo");

    let missing = entities
        .credentials
        .update(&Identifier::NaturalKey("ninguem@email.com".into()), &json!({ "password_hash": "x" }))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Planos não têm chave natural
    let unsupported = entities
        .plans
        .update(&Identifier::NaturalKey("x".into()), &json!({ "nome": "y" }))
        .await;
    assert!(matches!(unsupported, Err(AppError::Validation(_))));
}

// =========================================================================
//  O MESMO CONTRATO PARA OUTRAS ENTIDADES
// =========================================================================

/// create -> filter(id) -> update -> delete, e filter({}) == list().
async fn crud_contract<T>(adapter: &EntityAdapter<T>, fields: Value, change: (&str, Value))
where
    T: Entity + Serialize + PartialEq + Debug,
{
    let created = adapter.create(&fields).await.unwrap();
    let created_json = serde_json::to_value(&created).unwrap();
    for (column, value) in fields.as_object().unwrap() {
        assert_eq!(&created_json[column], value, "coluna {column}");
    }
    let id = created_json["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert!(created_json["created_at"].is_string());

    assert_eq!(adapter.filter(&Filter::by_id(&id)).await.unwrap(), vec![created]);

    let (column, value) = change;
    adapter
        .update(&Identifier::Id(id.clone()), &json!({ column: value.clone() }))
        .await
        .unwrap();
    let reread = adapter.find_by_id(&id).await.unwrap().unwrap();
    let reread_json = serde_json::to_value(&reread).unwrap();
    assert_eq!(reread_json[column], value);
    for (key, before) in created_json.as_object().unwrap() {
        if key != column && key != "updated_at" {
            assert_eq!(&reread_json[key], before, "coluna {key} mudou");
        }
    }

    assert_eq!(adapter.filter(&Filter::new()).await.unwrap(), adapter.list().await.unwrap());

    adapter.delete(&id).await.unwrap();
    assert!(adapter.filter(&Filter::by_id(&id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn crud_contract_holds_for_members() {
    let entities = Entities::in_memory();
    crud_contract(
        &entities.members,
        json!({
            "numero_associado": "CS000010",
            "nome_completo": "Ana Costa",
            "cpf": "10020030040",
            "email": "ana@email.com",
            "data_nascimento": "1990-05-20",
            "status": "ativo",
            "data_adesao": "2024-03-01"
        }),
        ("data_nascimento", json!("1991-06-21")),
    )
    .await;
}

#[tokio::test]
async fn crud_contract_holds_for_payments() {
    let entities = Entities::in_memory();
    crud_contract(
        &entities.payments,
        json!({
            "cooperado_id": "m1",
            "valor": 300.5,
            "tipo": "inscricao",
            "status": "pendente",
            "data_vencimento": "2024-03-08",
            "descricao": "Taxa de inscrição"
        }),
        ("valor", json!(275.25)),
    )
    .await;
}

#[tokio::test]
async fn crud_contract_holds_for_notifications() {
    let entities = Entities::in_memory();
    crud_contract(
        &entities.notifications,
        json!({
            "destinatario_id": "m1",
            "tipo": "boas_vindas",
            "titulo": "Bem-vindo",
            "mensagem": "Sua inscrição foi aprovada.",
            "lida": false
        }),
        ("lida", json!(true)),
    )
    .await;
}
