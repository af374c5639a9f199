/// Vehicle attributes carried on an insurance line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDescriptor {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: String,
    pub plate: String,
    pub vin_code: String,
}

/// Partial update of a [`VehicleDescriptor`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleUpdate {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub vin_code: Option<String>,
}

impl VehicleUpdate {
    pub fn is_empty(&self) -> bool {
        self == &VehicleUpdate::default()
    }

    pub fn apply_to(self, vehicle: &mut VehicleDescriptor) {
        if let Some(brand) = self.brand {
            vehicle.brand = brand;
        }
        if let Some(model) = self.model {
            vehicle.model = model;
        }
        if let Some(year) = self.year {
            vehicle.year = Some(year);
        }
        if let Some(color) = self.color {
            vehicle.color = color;
        }
        if let Some(plate) = self.plate {
            vehicle.plate = plate;
        }
        if let Some(vin) = self.vin_code {
            vehicle.vin_code = vin.trim().to_uppercase();
        }
    }
}

impl VehicleDescriptor {
    /// Short human label, e.g. `Lada Vesta (А123ВС77)`.
    pub fn label(&self) -> String {
        let name = [self.brand.trim(), self.model.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        match (name.is_empty(), self.plate.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => name,
            (true, false) => self.plate.trim().to_string(),
            (false, false) => format!("{} ({})", name, self.plate.trim()),
        }
    }
}
