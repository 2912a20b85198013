//! End-to-end scenarios run through the `analyze` façade.
//!
//! Each test builds a small farm, runs the full report, and checks the
//! figures a back-office user would read off the dashboard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use safra_analytics::{AnalyticsConfig, AnalyticsError, analyze_records};
use safra_types::{
    ConsumableKind, CostCategory, EquipmentId, ExpenseId, ExpenseRecord, FarmReport, Field,
    FieldId, MaintenanceId, MaintenanceRecord, MovementDirection, MovementId, MovementRecord,
    OperationId, OperationKind, OperationRecord, RecordSet, Reference, Season, SeasonId,
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[derive(Default)]
struct FarmBuilder {
    records: RecordSet,
}

impl FarmBuilder {
    fn season(&mut self, name: &str, month: u32, revenue: Decimal) -> SeasonId {
        let id = SeasonId::new();
        self.records.seasons.push(Season {
            id,
            name: name.to_owned(),
            start_date: day(month, 1),
            end_date: Some(day(month, 28)),
            in_progress: false,
            total_revenue: revenue,
            total_harvested: Decimal::ZERO,
        });
        id
    }

    fn field(&mut self, area: Decimal) -> FieldId {
        let id = FieldId::new();
        self.records.fields.push(Field {
            id,
            name: format!("Talhão {}", self.records.fields.len()),
            area_hectares: area,
        });
        id
    }

    fn operation(&mut self, season: SeasonId, field: FieldId) -> Reference {
        let id = OperationId::new();
        self.records.operations.push(OperationRecord {
            id,
            kind: OperationKind::Harvest,
            season_id: Some(season),
            field_id: Some(field),
            equipment_id: Some(EquipmentId::new()),
            employee_id: None,
            duration_hours: dec!(8),
            consumption: dec!(40),
            date: day(3, 10),
        });
        Reference::Harvest(id)
    }

    fn expense(&mut self, tag: &str, amount: Decimal, reference: Option<Reference>) {
        self.records.expenses.push(ExpenseRecord {
            id: ExpenseId::new(),
            category: tag.to_owned(),
            amount,
            date: day(3, 11),
            reference,
            season_id: None,
        });
    }

    fn maintenance(&mut self, season: SeasonId, amount: Decimal) {
        self.records.maintenance.push(MaintenanceRecord {
            id: MaintenanceId::new(),
            equipment_id: Some(EquipmentId::new()),
            amount,
            date: day(3, 12),
            season_id: Some(season),
        });
    }

    fn fuel_entry(&mut self, quantity: Decimal, unit_cost: Decimal) {
        self.records.movements.push(MovementRecord {
            id: MovementId::new(),
            consumable: ConsumableKind::Fuel,
            direction: MovementDirection::Entry,
            quantity,
            unit_cost: Some(unit_cost),
            date: day(2, 1),
            reference: None,
        });
    }

    fn report(self) -> FarmReport {
        analyze_records(self.records, &AnalyticsConfig::default()).unwrap()
    }
}

#[test]
fn shared_overhead_splits_by_area() {
    let mut farm = FarmBuilder::default();
    let a = farm.season("Soja", 1, dec!(100000));
    let b = farm.season("Milho", 2, dec!(50000));
    let north = farm.field(dec!(60));
    let south = farm.field(dec!(40));
    farm.operation(a, north);
    farm.operation(b, south);
    farm.expense("Contabilidade", dec!(10000), None);

    let report = farm.report();
    assert_eq!(report.seasons[0].season_id, a);
    assert_eq!(report.seasons[0].cost_lines.shared_overhead, dec!(6000));
    assert_eq!(report.seasons[1].cost_lines.shared_overhead, dec!(4000));
    assert_eq!(report.seasons[0].profit, dec!(94000));
    assert_eq!(report.seasons[0].cost_per_hectare, dec!(100));
    assert_eq!(report.totals.cost, dec!(10000));
    assert_eq!(report.seasons[0].fields[0].overhead_cost, dec!(6000));
}

#[test]
fn rounded_shared_slices_add_up_to_the_pool() {
    let mut farm = FarmBuilder::default();
    farm.season("A", 1, Decimal::ZERO);
    farm.season("B", 2, Decimal::ZERO);
    farm.season("C", 3, Decimal::ZERO);
    farm.expense("Aluguel", dec!(100), None);

    let report = farm.report();
    let shared: Decimal = report
        .seasons
        .iter()
        .map(|s| s.cost_lines.shared_overhead)
        .sum();
    assert_eq!(shared, dec!(100));
}

#[test]
fn fuel_price_is_quantity_weighted() {
    let mut farm = FarmBuilder::default();
    farm.fuel_entry(dec!(100), dec!(5.00));
    farm.fuel_entry(dec!(50), dec!(6.20));

    let report = farm.report();
    assert_eq!(report.average_prices[&ConsumableKind::Fuel], dec!(5.40));
    assert_eq!(report.average_prices[&ConsumableKind::Input], Decimal::ZERO);
}

#[test]
fn season_break_even_and_margin_of_safety() {
    let mut farm = FarmBuilder::default();
    let season = farm.season("Soja", 1, dec!(100000));
    let field = farm.field(dec!(10));
    let op = farm.operation(season, field);
    farm.expense("Uso de Combustível", dec!(50000), Some(op));
    farm.maintenance(season, dec!(20000));

    let report = farm.report();
    let outlook = &report.outlooks[0].break_even;
    assert_eq!(outlook.fixed_costs, dec!(20000));
    assert_eq!(outlook.variable_costs, dec!(50000));
    assert_eq!(outlook.contribution_margin, dec!(50000));
    assert_eq!(outlook.break_even_revenue, dec!(40000));
    assert_eq!(outlook.margin_of_safety_pct, dec!(60));
    assert_eq!(report.seasons[0].cost, dec!(70000));
    assert_eq!(report.seasons[0].fields[0].usage_cost, dec!(50000));
}

#[test]
fn farm_break_even_reads_maintenance_records() {
    let mut farm = FarmBuilder::default();
    let season = farm.season("Soja", 1, dec!(100000));
    let field = farm.field(dec!(10));
    let op = farm.operation(season, field);
    farm.expense("Uso de Combustível", dec!(50000), Some(op));
    farm.maintenance(season, dec!(20000));

    let report = farm.report();
    let farm_wide = &report.break_even;
    assert_eq!(farm_wide.fixed_costs, dec!(20000));
    assert_eq!(farm_wide.variable_costs, dec!(50000));
    assert_eq!(farm_wide.break_even_revenue, dec!(40000));
    assert_eq!(farm_wide.margin_of_safety_pct, dec!(60));
    assert_eq!(farm_wide, &report.outlooks[0].break_even);
}

#[test]
fn thirds_beside_a_large_usage_expense_still_balance() {
    let mut farm = FarmBuilder::default();
    let a = farm.season("A", 1, dec!(2000000));
    farm.season("B", 2, Decimal::ZERO);
    farm.season("C", 3, Decimal::ZERO);
    let bare = farm.field(Decimal::ZERO);
    let op = farm.operation(a, bare);
    farm.expense("Uso de Combustível", dec!(1234567.89), Some(op));
    farm.expense("Contador", dec!(10000), None);

    let report = farm.report();
    let shared: Vec<Decimal> = report
        .seasons
        .iter()
        .map(|s| s.cost_lines.shared_overhead)
        .collect();
    assert_eq!(shared, vec![dec!(3333.33), dec!(3333.33), dec!(3333.34)]);
    assert_eq!(report.seasons[0].cost, dec!(1237901.22));
    assert_eq!(report.totals.cost, dec!(1244567.89));
}

#[test]
fn uneven_areas_and_large_amounts_keep_the_pool_whole() {
    let cases: [(&[Decimal], Decimal, Decimal); 4] = [
        (&[dec!(7), dec!(13)], dec!(10000), dec!(1234567.89)),
        (&[dec!(7), dec!(13), dec!(3.3)], dec!(98765432.17), dec!(12345678.91)),
        (&[dec!(0.7), dec!(1.3), dec!(11), dec!(17)], dec!(1000000.01), dec!(99999999.99)),
        (&[dec!(123.45), dec!(0)], dec!(7777777.77), dec!(3333333.33)),
    ];

    for (areas, pool, usage) in cases {
        let mut farm = FarmBuilder::default();
        for (month, area) in (1..).zip(areas) {
            let season = farm.season("Safra", month, dec!(50000000));
            let field = farm.field(*area);
            let op = farm.operation(season, field);
            farm.expense("Uso de Insumo", usage, Some(op));
        }
        farm.expense("Contador", pool, None);

        let report = analyze_records(farm.records, &AnalyticsConfig::default()).unwrap();

        let shared: Decimal = report
            .seasons
            .iter()
            .map(|s| s.cost_lines.shared_overhead)
            .sum();
        assert_eq!(shared, pool, "shared slices for areas {areas:?}");
        assert_eq!(report.totals.cost_lines.shared_overhead, pool);

        let season_costs: Decimal = report.seasons.iter().map(|s| s.cost).sum();
        assert_eq!(season_costs, report.totals.cost);
        assert_eq!(report.diagnostics.unattributed_expenses, 0);
    }
}

#[test]
fn season_cost_is_the_sum_of_its_lines() {
    let mut farm = FarmBuilder::default();
    let a = farm.season("A", 1, dec!(90000));
    let b = farm.season("B", 2, dec!(45000));
    let c = farm.season("C", 3, dec!(15000));
    let fields = [farm.field(dec!(7)), farm.field(dec!(13)), farm.field(dec!(11))];
    for (season, field) in [a, b, c].into_iter().zip(fields) {
        let op = farm.operation(season, field);
        farm.expense("Uso de Combustível", dec!(1000.005), Some(op));
        farm.maintenance(season, dec!(333.335));
    }
    farm.expense("Contador", dec!(1000), None);

    let report = farm.report();
    for season in &report.seasons {
        let lines = &season.cost_lines;
        let total: Decimal = [
            lines.usage,
            lines.maintenance,
            lines.direct_overhead,
            lines.shared_overhead,
        ]
        .into_iter()
        .sum();
        assert_eq!(season.cost, total);
    }
}

#[test]
fn zero_revenue_has_zero_break_even() {
    let mut farm = FarmBuilder::default();
    let season = farm.season("Entressafra", 1, Decimal::ZERO);
    farm.maintenance(season, dec!(1500));

    let report = farm.report();
    assert_eq!(report.outlooks[0].break_even.break_even_revenue, Decimal::ZERO);
    assert_eq!(report.outlooks[0].break_even.margin_of_safety_pct, Decimal::ZERO);
    assert_eq!(report.break_even.break_even_revenue, Decimal::ZERO);
    assert_eq!(report.seasons[0].margin_pct, Decimal::ZERO);
}

#[test]
fn zero_variation_row_matches_the_season() {
    let mut farm = FarmBuilder::default();
    let season = farm.season("Soja", 1, dec!(87345.67));
    farm.maintenance(season, dec!(12345.89));

    let report = farm.report();
    let row = report.outlooks[0]
        .sensitivity
        .iter()
        .find(|r| r.variation_pct.is_zero())
        .unwrap();
    assert_eq!(row.revenue, report.seasons[0].revenue);
    assert_eq!(row.profit, report.seasons[0].profit);
    assert_eq!(row.margin_pct, report.seasons[0].margin_pct);

    let order: Vec<Decimal> = report.sensitivity.iter().map(|r| r.variation_pct).collect();
    assert_eq!(order, vec![dec!(-20), dec!(-10), dec!(0), dec!(10), dec!(20)]);
}

#[test]
fn category_totals_add_up_to_every_expense() {
    let mut farm = FarmBuilder::default();
    farm.expense("Compra de Insumo", dec!(1200.10), None);
    farm.expense("Compra de Combustível", dec!(800.20), None);
    farm.expense("Uso de Insumo", dec!(300.30), None);
    farm.expense("Uso de Combustível", dec!(150.40), None);
    farm.expense("Manutenção", dec!(410.50), None);
    farm.expense("Salários", dec!(2000.60), None);

    let report = farm.report();
    let total: Decimal = report.categories.totals.values().copied().sum();
    assert_eq!(report.categories.totals.len(), 6);
    assert_eq!(total, report.categories.total);
    assert_eq!(total, dec!(4862.10));
    assert_eq!(
        report.categories.totals[&CostCategory::AdministrativeOther],
        dec!(2000.60)
    );
}

#[test]
fn unresolved_usage_shows_up_in_diagnostics() {
    let mut farm = FarmBuilder::default();
    farm.season("Soja", 1, dec!(1000));
    farm.expense(
        "Uso de Combustível",
        dec!(321),
        Some(Reference::Planting(OperationId::new())),
    );

    let report = farm.report();
    assert_eq!(report.diagnostics.unattributed_expenses, 1);
    assert_eq!(report.diagnostics.unattributed_expense_amount, dec!(321));
    assert_eq!(report.totals.cost, Decimal::ZERO);
}

#[test]
fn negative_area_fails_the_whole_report() {
    let mut farm = FarmBuilder::default();
    farm.field(dec!(-1));

    let result = analyze_records(farm.records, &AnalyticsConfig::default());
    assert!(matches!(result, Err(AnalyticsError::Ledger(_))));
}

#[test]
fn records_from_json_wire_format() {
    let season = SeasonId::new();
    let field = FieldId::new();
    let op = OperationId::new();
    let json = format!(
        r#"{{
            "seasons": [{{"id": "{season}", "name": "Soja 24/25", "start_date": "2024-09-01",
                          "total_revenue": "250000.00"}}],
            "fields": [{{"id": "{field}", "name": "Sede", "area_hectares": 125}}],
            "operations": [{{"id": "{op}", "kind": "planting", "season_id": "{season}",
                             "field_id": "{field}", "duration_hours": "10", "consumption": 55,
                             "date": "2024-09-15"}}],
            "expenses": [
                {{"id": "{e1}", "category": "Uso de Insumo", "amount": "18000.00",
                  "date": "2024-09-15", "reference": {{"table": "plantio", "id": "{op}"}}}},
                {{"id": "{e2}", "category": "Uso de Insumo", "amount": 500,
                  "date": "2024-09-16", "reference": {{"table": "irrigacao", "id": "7"}}}}
            ]
        }}"#,
        e1 = ExpenseId::new(),
        e2 = ExpenseId::new(),
    );
    let records: RecordSet = serde_json::from_str(&json).unwrap();

    let report = analyze_records(records, &AnalyticsConfig::default()).unwrap();
    assert_eq!(report.seasons[0].cost_lines.usage, dec!(18000));
    assert_eq!(report.seasons[0].area_hectares, dec!(125));
    assert_eq!(report.seasons[0].cost_per_hectare, dec!(144));
    assert_eq!(report.diagnostics.unattributed_expense_amount, dec!(500));
    assert_eq!(report.productivity.overall.hours_worked, dec!(10));
}
