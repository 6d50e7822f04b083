use cellwatch_core::*;
use jiff::Timestamp;

fn at(offset: i64) -> Timestamp {
    Timestamp::from_second(1_715_000_000 + offset).unwrap()
}

fn sample(voltage: f64, current: f64, temperature: f64, capacity: f64, mode: Mode) -> Measurement {
    Measurement {
        voltage,
        current,
        temperature,
        capacity,
        mode,
    }
}

/// Two cells, two sweeps.
#[test]
fn two_cell_dashboard_cycles() -> Result<(), StoreError> {
    let mut store = TelemetryStore::new(2)?;

    let first = [
        (CellId(1), sample(3.7, 1.0, 25.0, 90.0, Mode::Charging)),
        (CellId(2), sample(3.6, -0.5, 28.0, 85.0, Mode::Discharging)),
    ];
    store.ingest_batch_at(first, at(0))?;

    let snapshot = store.latest_snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].cell, CellId(1));
    assert_eq!(snapshot[0].reading.measurement(), first[0].1);
    assert_eq!(snapshot[1].reading.measurement(), first[1].1);
    assert_eq!(store.average_capacity(), Some(87.5));

    store.ingest_batch_at(
        [
            (CellId(1), sample(3.8, 0.9, 26.0, 91.0, Mode::Charging)),
            (CellId(2), sample(3.5, -0.6, 29.0, 84.0, Mode::Discharging)),
        ],
        at(5),
    )?;

    let series = store.series(&CellId(1));
    assert_eq!(series.len(), 2);
    assert!(series[0].timestamp < series[1].timestamp);
    assert_eq!(series[1].voltage, 3.8);

    Ok(())
}

#[test]
fn first_reading_is_evicted_after_101_ingests() -> Result<(), StoreError> {
    let mut store = TelemetryStore::new(1)?;

    for i in 0..101 {
        store.ingest_at(
            CellId(1),
            sample(i as f64, 0.0, 20.0, 50.0, Mode::Idle),
            at(i),
        )?;
    }

    let series = store.series(&CellId(1));
    assert_eq!(series.len(), RETENTION_LIMIT);
    assert_eq!(series[0].timestamp, at(1));
    assert_eq!(series[0].voltage, 1.0);
    assert_eq!(series[99].voltage, 100.0);

    Ok(())
}

#[test]
fn snapshot_is_fresh_regardless_of_history() -> Result<(), StoreError> {
    let mut store = TelemetryStore::new(4)?;

    for tick in 0..150 {
        let sweep = CellId::range(4).map(|cell| {
            let v = f64::from(cell.0) + tick as f64;
            (cell, sample(v, v, v, v, Mode::Idle))
        });
        store.ingest_batch_at(sweep, at(tick))?;
    }

    let last: Vec<(CellId, Measurement)> = CellId::range(4)
        .map(|cell| (cell, sample(4.1, 2.0, 31.0, 77.0, Mode::Charging)))
        .collect();
    store.ingest_batch_at(last.clone(), at(500))?;

    let snapshot: Vec<(CellId, Measurement)> = store
        .latest_snapshot()
        .into_iter()
        .map(|entry| (entry.cell, entry.reading.measurement()))
        .collect();

    assert_eq!(snapshot, last);

    Ok(())
}

#[test]
fn export_is_complete_and_ordered() -> Result<(), StoreError> {
    let mut store = TelemetryStore::with_retention(3, 10)?;

    for tick in 0..14 {
        store.ingest_at(CellId(2), sample(2.0, 0.0, 20.0, tick as f64, Mode::Idle), at(tick))?;
    }
    for tick in 0..4 {
        store.ingest_at(
            CellId(1),
            sample(1.0, 0.0, 20.0, tick as f64, Mode::Charging),
            at(100 + tick),
        )?;
    }

    let rows = store.export();
    let expected: usize = store.cells().iter().map(|c| store.series(c).len()).sum();
    assert_eq!(rows.len(), expected);
    assert_eq!(rows.len(), 14);

    assert!(rows[..4].iter().all(|r| r.entity == CellId(1)));
    assert!(rows[4..].iter().all(|r| r.entity == CellId(2)));
    assert!(rows.windows(2).all(|pair| {
        pair[0].entity < pair[1].entity
            || (pair[0].entity == pair[1].entity && pair[0].timestamp <= pair[1].timestamp)
    }));

    for row in &rows {
        let series = store.series(&row.entity);
        assert!(series.iter().any(|r| ExportRow::new(row.entity, r) == *row));
    }

    let csv = store.export_csv();
    assert_eq!(csv.lines().count(), rows.len() + 1);
    assert_eq!(csv.lines().next(), Some(CSV_HEADER));

    Ok(())
}

#[test]
fn ingest_into_one_cell_leaves_others_alone() -> Result<(), StoreError> {
    let mut store = TelemetryStore::new(3)?;
    store.ingest_batch_at(
        CellId::range(3).map(|cell| (cell, sample(3.6, 0.0, 25.0, 80.0, Mode::Idle))),
        at(0),
    )?;

    let before_2 = store.series(&CellId(2));
    let before_3 = store.series(&CellId(3));

    for tick in 1..=120 {
        store.ingest_at(CellId(1), sample(3.9, 1.2, 30.0, 95.0, Mode::Charging), at(tick))?;
    }

    assert_eq!(store.series(&CellId(2)), before_2);
    assert_eq!(store.series(&CellId(3)), before_3);
    assert_eq!(store.series_len(&CellId(1)), RETENTION_LIMIT);

    Ok(())
}
