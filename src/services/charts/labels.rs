use once_cell::sync::Lazy;
use std::collections::HashMap;

// Human-readable labels for the well-known listing columns; anything else
// falls back to the raw column name.
static AXIS_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("odometer", "Odometro (millas)"),
        ("price", "Precio (USD)"),
        ("model_year", "Ano del modelo"),
        ("days_listed", "Dias publicado"),
        ("condition", "Condicion"),
        ("count", "Numero de vehiculos"),
    ])
});

pub fn axis_label(column: &str) -> String {
    AXIS_LABELS
        .get(column)
        .map(|label| label.to_string())
        .unwrap_or_else(|| column.to_string())
}

pub fn histogram_title(column: &str) -> String {
    match column {
        "odometer" => "Distribucion del Odometro (Kilometraje)".to_string(),
        _ => format!("Distribucion de {}", column),
    }
}

pub fn scatter_title(x: &str, y: &str) -> String {
    match (x, y) {
        ("odometer", "price") => "Relacion entre Odometro y Precio".to_string(),
        _ => format!("Relacion entre {} y {}", x, y),
    }
}

pub fn bar_title(column: &str) -> String {
    match column {
        "condition" => "Numero de Vehiculos por Condicion".to_string(),
        _ => format!("Numero de vehiculos por {}", column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_columns_get_overrides() {
        assert_eq!(axis_label("odometer"), "Odometro (millas)");
        assert_eq!(axis_label("price"), "Precio (USD)");
    }

    #[test]
    fn unknown_columns_keep_their_name() {
        assert_eq!(axis_label("days_on_lot"), "days_on_lot");
        assert_eq!(histogram_title("days_listed"), "Distribucion de days_listed");
    }
}
