//! Static region metadata table.
//!
//! Region codes, display names and macro-region groupings are fixed at
//! compile time and never change at runtime. History entries may reference
//! codes that are absent here; lookups fall back to the bare code.

use crate::api::Region;

/// (code, display name, macro-region)
static REGION_TABLE: &[(&str, &str, &str)] = &[
    // Байкал и Дальний Восток
    ("BRT", "Бурятия", "Байкал и Дальний Восток"),
    ("IRK", "Иркутская область", "Байкал и Дальний Восток"),
    ("KAM", "Камчатский край", "Байкал и Дальний Восток"),
    ("KHB", "Хабаровский край", "Байкал и Дальний Восток"),
    ("SAH", "Сахалинская область", "Байкал и Дальний Восток"),
    ("VLD", "Владивосток", "Байкал и Дальний Восток"),
    ("BIR", "Биробиджан", "Байкал и Дальний Восток"),
    ("AND", "Андомский", "Байкал и Дальний Восток"),
    ("MGD", "Магаданская область", "Байкал и Дальний Восток"),
    // Волга
    ("CHV", "Чувашия", "Волга"),
    ("KAZ", "Казань", "Волга"),
    ("NIN", "Нижний Новгород", "Волга"),
    ("SAM", "Самара", "Волга"),
    ("YOL", "Йошкар-Ола", "Волга"),
    ("KIR", "Киров", "Волга"),
    ("ULN", "Ульяновск", "Волга"),
    // Москва
    ("CNT", "Центральный округ Москвы", "Москва"),
    ("NEA", "Северо-Восточный округ Москвы", "Москва"),
    ("NWS", "Северо-Западный округ Москвы", "Москва"),
    ("SEA", "Юго-Восточный округ Москвы", "Москва"),
    ("SWS", "Юго-Западный округ Москвы", "Москва"),
    // Северо-запад
    ("ARH", "Архангельская область", "Северо-запад"),
    ("KLN", "Калининградская область", "Северо-запад"),
    ("MUR", "Мурманская область", "Северо-запад"),
    ("NOV", "Новгородская область", "Северо-запад"),
    ("PSK", "Псковская область", "Северо-запад"),
    ("PZV", "Петрозаводск", "Северо-запад"),
    ("SPE", "Санкт-Петербург Восток", "Северо-запад"),
    ("SPN", "Санкт-Петербург Север", "Северо-запад"),
    ("SPS", "Санкт-Петербург Юг", "Северо-запад"),
    ("SPW", "Санкт-Петербург Запад", "Северо-запад"),
    ("VOL", "Вологда", "Северо-запад"),
    ("NEN", "Ненецкий автономный округ", "Северо-запад"),
    // Сибирь
    ("BRN", "Барнаул", "Сибирь"),
    ("KHA", "Красноярский край", "Сибирь"),
    ("KRS", "Красноярск", "Сибирь"),
    ("NSK", "Новосибирская область", "Сибирь"),
    ("OMS", "Омская область", "Сибирь"),
    ("TYV", "Тыва", "Сибирь"),
    ("GRN", "Горно-Алтайск", "Сибирь"),
    ("KEM", "Кемеровская область", "Сибирь"),
    ("TOM", "Томская область", "Сибирь"),
    // Урал (Ижевск обслуживается уральским макрорегионом)
    ("IZH", "Ижевск", "Урал"),
    ("CHE", "Челябинская область", "Урал"),
    ("EKT", "Екатеринбург", "Урал"),
    ("HAN", "Ханты-Мансийский АО", "Урал"),
    ("KOM", "Коми", "Урал"),
    ("ORB", "Оренбургская область", "Урал"),
    ("PRM", "Пермский край", "Урал"),
    ("TUM", "Тюменская область", "Урал"),
    ("YNR", "Ямало-Ненецкий АО", "Урал"),
    ("KRG", "Курганская область", "Урал"),
    ("UFA", "Уфа", "Урал"),
    // Центр
    ("IVN", "Ивановская область", "Центр"),
    ("KLG", "Калужская область", "Центр"),
    ("KOS", "Костромская область", "Центр"),
    ("RYZ", "Рязанская область", "Центр"),
    ("SMO", "Смоленская область", "Центр"),
    ("TUL", "Тульская область", "Центр"),
    ("TVE", "Тверская область", "Центр"),
    ("VLA", "Владимирская область", "Центр"),
    ("YRL", "Ярославская область", "Центр"),
    // Черноземье
    ("BEL", "Белгородская область", "Черноземье"),
    ("BRY", "Брянская область", "Черноземье"),
    ("KUR", "Курская область", "Черноземье"),
    ("LIP", "Липецкая область", "Черноземье"),
    ("MRD", "Мордовия", "Черноземье"),
    ("ORL", "Орловская область", "Черноземье"),
    ("PNZ", "Пензенская область", "Черноземье"),
    ("SRV", "Саратовская область", "Черноземье"),
    ("TAM", "Тамбовская область", "Черноземье"),
    ("VRN", "Воронежская область", "Черноземье"),
    // Юг
    ("KRA", "Краснодарский край", "ЮГ"),
    ("ROS", "Ростовская область", "ЮГ"),
    ("STV", "Ставропольский край", "ЮГ"),
    ("VLG", "Волгоградская область", "ЮГ"),
];

/// Look up a region by its short code. Codes are matched case-sensitively;
/// callers normalize to uppercase at the HTTP boundary.
pub fn lookup(code: &str) -> Option<Region> {
    REGION_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(c, name, mr)| Region {
            code: (*c).to_string(),
            name: (*name).to_string(),
            macro_region: (*mr).to_string(),
        })
}

/// Display name for a code, falling back to the code itself for regions
/// the table does not know about.
pub fn display_name(code: &str) -> String {
    lookup(code)
        .map(|r| r.name)
        .unwrap_or_else(|| code.to_string())
}

/// All known regions in table order.
pub fn all() -> Vec<Region> {
    REGION_TABLE
        .iter()
        .map(|(c, name, mr)| Region {
            code: (*c).to_string(),
            name: (*name).to_string(),
            macro_region: (*mr).to_string(),
        })
        .collect()
}

/// Whether the code is present in the static table.
pub fn is_known(code: &str) -> bool {
    REGION_TABLE.iter().any(|(c, _, _)| *c == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_code() {
        let region = lookup("KAZ").expect("KAZ is in the table");
        assert_eq!(region.name, "Казань");
        assert_eq!(region.macro_region, "Волга");
    }

    #[test]
    fn lookup_unknown_code_is_none() {
        assert!(lookup("XXX").is_none());
        assert_eq!(display_name("XXX"), "XXX");
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut codes: Vec<&str> = REGION_TABLE.iter().map(|(c, _, _)| *c).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn all_regions_are_nonempty() {
        let regions = all();
        assert!(regions.len() >= 70);
        assert!(regions
            .iter()
            .all(|r| !r.name.is_empty() && !r.macro_region.is_empty()));
    }
}
