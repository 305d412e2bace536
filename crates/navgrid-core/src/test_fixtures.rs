//! Shared test world: clients with cases, subcases, payables and payments.
//!
//! `client.client` is the main entity. Its `case.subcase` relation is only
//! browsable for agents (`is_agent = true`).

use crate::{
    db::{MemoryStore, Record},
    model::{DetailMapping, EntityModel, FieldModel, RelationEntry},
    schema::SchemaRegistry,
    table::{ColumnDecl, TableDeclaration, TableRegistry},
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const CLIENT: &str = "client.client";
pub const COUNTRY: &str = "geo.country";
pub const CONTINENT: &str = "geo.continent";
pub const CASE: &str = "case.case";
pub const SUBCASE: &str = "case.subcase";
pub const PAYABLE: &str = "purchase.payable";
pub const PAYMENT: &str = "purchase.payment";

pub fn client_model() -> EntityModel {
    EntityModel::builder(CLIENT, "Client")
        .field(FieldModel::text("name"))
        .field(FieldModel::text("archive_no"))
        .field(FieldModel::boolean("is_agent"))
        .field(FieldModel::reference("country", COUNTRY))
        .enabled_field("enabled")
        .relation(RelationEntry::new(CASE, "client", "Cases"))
        .relation(
            RelationEntry::new(SUBCASE, "case.client", "Subcases").visible_when("is_agent", true),
        )
        .relation(RelationEntry::new(PAYABLE, "client", "Payables"))
        .relation(RelationEntry::new(PAYMENT, "payable.client", "Payments"))
        .detail(
            DetailMapping::new("name")
                .subtitle("archive_no")
                .desc("Country", "country.name")
                .desc("Continent", "country.continent.name")
                .desc("Phone", "phone"),
        )
        .form("client_form")
        .extra_action("balance")
        .build()
}

pub fn schemas() -> Arc<SchemaRegistry> {
    let registry = SchemaRegistry::new()
        .with(
            EntityModel::builder(CONTINENT, "Continent")
                .field(FieldModel::text("name"))
                .build(),
        )
        .and_then(|r| {
            r.with(
                EntityModel::builder(COUNTRY, "Country")
                    .field(FieldModel::text("name"))
                    .field(FieldModel::reference("continent", CONTINENT))
                    .build(),
            )
        })
        .and_then(|r| r.with(client_model()))
        .and_then(|r| {
            r.with(
                EntityModel::builder(CASE, "Case")
                    .field(FieldModel::text("name"))
                    .field(FieldModel::reference("client", CLIENT))
                    .enabled_field("enabled")
                    .form("case_form")
                    .build(),
            )
        })
        .and_then(|r| {
            r.with(
                EntityModel::builder(SUBCASE, "Subcase")
                    .field(FieldModel::text("name"))
                    .field(FieldModel::reference("case", CASE))
                    .enabled_field("enabled")
                    .form("subcase_form")
                    .build(),
            )
        })
        .and_then(|r| {
            r.with(
                EntityModel::builder(PAYABLE, "Payable")
                    .field(FieldModel::text("title"))
                    .field(FieldModel::decimal("amount"))
                    .field(FieldModel::reference("client", CLIENT))
                    .enabled_field("enabled")
                    .form("payable_form")
                    .build(),
            )
        })
        .and_then(|r| {
            r.with(
                EntityModel::builder(PAYMENT, "Payment")
                    .field(FieldModel::decimal("amount"))
                    .field(FieldModel::reference("payable", PAYABLE))
                    .enabled_field("enabled")
                    .build(),
            )
        })
        .expect("fixture entities should register");

    registry.validate().expect("fixture schema should validate");

    Arc::new(registry)
}

fn client(id: i64, name: &str, archive_no: &str, is_agent: bool, country: i64, enabled: bool) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("archive_no", archive_no)
        .with("is_agent", is_agent)
        .with("country", country)
        .with("enabled", enabled)
}

fn owned(id: i64, field: &str, owner: i64, enabled: bool) -> Record {
    Record::new()
        .with("id", id)
        .with(field, owner)
        .with("enabled", enabled)
}

fn amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Five enabled clients plus one disabled one.
pub fn store() -> MemoryStore {
    store_for(&schemas())
}

pub fn store_for(schemas: &Arc<SchemaRegistry>) -> MemoryStore {
    let mut store = MemoryStore::new(Arc::clone(schemas));
    let rows: Vec<(&str, Record)> = vec![
        (CONTINENT, Record::new().with("id", 1).with("name", "Asia")),
        (CONTINENT, Record::new().with("id", 2).with("name", "Europe")),
        (COUNTRY, Record::new().with("id", 1).with("name", "China").with("continent", 1)),
        (COUNTRY, Record::new().with("id", 2).with("name", "France").with("continent", 2)),
        (CLIENT, client(1, "Alice Zhang", "A-001", false, 1, true)),
        (CLIENT, client(2, "Bob Foo", "A-002", true, 2, true)),
        (CLIENT, client(3, "Carol", "A-003", false, 1, true)),
        (CLIENT, client(4, "Dave Food", "A-004", false, 2, true)),
        (CLIENT, client(5, "Eve", "A-005", true, 1, true)),
        (CLIENT, client(6, "Frank Foo", "A-006", false, 2, false)),
        (CASE, owned(1, "client", 1, true).with("name", "Contract dispute")),
        (CASE, owned(2, "client", 1, true).with("name", "Visa")),
        (CASE, owned(3, "client", 2, false).with("name", "Audit")),
        (CASE, owned(4, "client", 2, true).with("name", "Merger")),
        (SUBCASE, owned(1, "case", 3, true).with("name", "Review")),
        (SUBCASE, owned(2, "case", 4, true).with("name", "Filing")),
        (SUBCASE, owned(3, "case", 4, false).with("name", "Appeal")),
        (PAYABLE, owned(1, "client", 1, true).with("title", "Retainer").with("amount", amount(10_050))),
        (PAYABLE, owned(2, "client", 1, true).with("title", "Filing fee").with("amount", amount(20_000))),
        (PAYABLE, owned(3, "client", 2, true).with("title", "Audit fee").with("amount", amount(5_000))),
        (PAYMENT, owned(1, "payable", 1, true).with("amount", amount(4_025))),
        (PAYMENT, owned(2, "payable", 1, true).with("amount", amount(1_000))),
        (PAYMENT, owned(3, "payable", 3, true).with("amount", amount(5_000))),
        (PAYMENT, owned(4, "payable", 2, false).with("amount", amount(500))),
    ];
    for (entity, record) in rows {
        store
            .insert(entity, record)
            .expect("fixture record should insert");
    }

    store
}

pub fn client_table() -> TableDeclaration {
    TableDeclaration::new(CLIENT)
        .column(ColumnDecl::new("name"))
        .column(ColumnDecl::new("id").searchable(false))
        .fields(["archive_no", "country.name", "country.continent.name", "phone"])
        .detail_url("/client/{}")
}

pub fn tables(schemas: &Arc<SchemaRegistry>) -> TableRegistry {
    let decls = [
        client_table(),
        TableDeclaration::new(CASE).fields(["id", "name", "client.name"]),
        TableDeclaration::new(SUBCASE).fields(["id", "name", "case.name", "case.client.name"]),
        TableDeclaration::new(PAYABLE).fields(["id", "title", "amount"]),
        TableDeclaration::new(PAYMENT).fields(["id", "amount", "payable.title"]),
    ];
    let registry = TableRegistry::new(Arc::clone(schemas));
    for decl in &decls {
        registry
            .register(decl)
            .expect("fixture table should compile");
    }

    registry
}
