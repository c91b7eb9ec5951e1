//! Static menu offered by every table card

/// Menu item names, in display order.
pub const MENU: [&str; 6] = ["Pizza", "Burger", "Pasta", "Salad", "Sushi", "Steak"];
