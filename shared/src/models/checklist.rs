//! Standard store checklist

/// Questions a new inspection starts with
pub const DEFAULT_CHECKLIST: &[&str] = &[
    "Store entrance is clean and unobstructed",
    "Floors are clean and dry",
    "Shelves are fully stocked and faced",
    "Price tags are visible and accurate",
    "Promotional displays are set up correctly",
    "Expired products have been removed",
    "Cold storage is at the correct temperature",
    "Fire exits are clear and signed",
    "Fire extinguishers are accessible and in date",
    "Restrooms are clean and supplied",
    "Checkout area is tidy",
    "Staff are in uniform with name badges",
    "All lighting is working",
    "Trash bins have been emptied",
    "Safety signage is displayed",
];

/// Owned copy of the standard checklist
pub fn default_checklist() -> Vec<String> {
    DEFAULT_CHECKLIST.iter().map(|q| q.to_string()).collect()
}
