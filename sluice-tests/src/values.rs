use crate::table;
use indoc::formatdoc;
use rust_decimal::Decimal;
use sluice::{Connection, Driver, Value, bindings};
use std::str::FromStr;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use uuid::Uuid;

pub fn values<D: Driver>(connection: &mut Connection<D>) {
    let samples = table(connection, "samples");
    connection
        .statement(&format!("DROP TABLE IF EXISTS {samples}"), bindings![])
        .expect("Failed to drop the samples table");
    connection
        .statement(
            &formatdoc! {"
                    CREATE TABLE {} (
                        flag INTEGER,
                        small INTEGER,
                        big INTEGER,
                        unsigned INTEGER,
                        ratio REAL,
                        price TEXT,
                        label TEXT,
                        payload BLOB,
                        day TEXT,
                        moment TEXT,
                        stamp TEXT,
                        stamp_tz TEXT,
                        code TEXT,
                        absent TEXT
                    )
                ",
                samples
            },
            bindings![],
        )
        .expect("Failed to create the samples table");

    let day = Date::from_calendar_date(2025, Month::March, 14).unwrap();
    let moment = Time::from_hms_milli(9, 26, 53, 589).unwrap();
    let stamp = PrimitiveDateTime::new(day, moment);
    let stamp_tz = stamp.assume_offset(UtcOffset::from_hms(2, 0, 0).unwrap());
    let code = Uuid::new_v4();
    let price = Decimal::from_str("1234.50").unwrap();

    let inserted = connection
        .insert(
            &formatdoc! {"
                    INSERT INTO {} (
                        flag, small, big, unsigned, ratio, price, label,
                        payload, day, moment, stamp, stamp_tz, code, absent
                    ) VALUES (
                        :flag, :small, :big, :unsigned, :ratio, :price, :label,
                        :payload, :day, :moment, :stamp, :stamp_tz, :code, :absent
                    )
                ",
                samples
            },
            bindings! {
                "flag" => true,
                "small" => -42i32,
                "big" => i64::MIN,
                "unsigned" => 9_876_543_210u64,
                "ratio" => 0.25f64,
                "price" => price,
                "label" => "it's \"quoted\"",
                "payload" => vec![0u8, 1, 254, 255],
                "day" => day,
                "moment" => moment,
                "stamp" => stamp,
                "stamp_tz" => stamp_tz,
                "code" => code,
                "absent" => Option::<String>::None,
            },
        )
        .expect("Failed to insert the sample");
    assert!(inserted);

    let row = connection
        .select_one(&format!("SELECT * FROM {samples}"), bindings![])
        .expect("Failed to select the sample")
        .expect("Expected one sample");
    assert_eq!(row.get::<bool>("flag").unwrap(), true);
    assert_eq!(row.get::<i32>("small").unwrap(), -42);
    assert_eq!(row.get::<i64>("big").unwrap(), i64::MIN);
    assert_eq!(row.get::<u64>("unsigned").unwrap(), 9_876_543_210);
    assert_eq!(row.get::<f64>("ratio").unwrap(), 0.25);
    assert_eq!(row.get::<Decimal>("price").unwrap(), price);
    assert_eq!(row.get::<String>("label").unwrap(), "it's \"quoted\"");
    assert_eq!(row.get::<Vec<u8>>("payload").unwrap(), vec![0u8, 1, 254, 255]);
    assert_eq!(row.get::<Date>("day").unwrap(), day);
    assert_eq!(row.get::<Time>("moment").unwrap(), moment);
    assert_eq!(row.get::<PrimitiveDateTime>("stamp").unwrap(), stamp);
    assert_eq!(row.get::<OffsetDateTime>("stamp_tz").unwrap(), stamp_tz);
    assert_eq!(row.get::<Uuid>("code").unwrap(), code);
    assert_eq!(row.get::<Option<String>>("absent").unwrap(), None);
    assert!(row.get_column("absent").unwrap().is_null());
    assert!(row.get::<i32>("missing_column").is_err());
    assert!(matches!(row.get_column("label"), Some(Value::Varchar(Some(..)))));
}
