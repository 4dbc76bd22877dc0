use aerix_core::model::SeatTemplate;
use serde::Serialize;
use std::collections::HashSet;

/// The fixed letter sequence assigned to columns. Templates asking for more
/// than 8 seats per row are clamped to these letters; wider cabins are a
/// known limitation of the flat row/letter scheme.
const SEAT_LETTERS: &[u8] = b"ABCDEFGH";

#[derive(Debug, Clone, Serialize)]
pub struct SeatCell {
    pub seat: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub seat_map: Vec<Vec<SeatCell>>,
    pub layout: String,
    pub total_seats: i64,
    pub available_seats: i64,
}

/// Build the synthetic seat grid for an airplane template: rows `1..=rows`,
/// columns lettered `A..` up to `seats_per_row`, each cell flagged against
/// the occupied set.
pub fn generate(template: &SeatTemplate, total_seats: i64, occupied: &HashSet<String>) -> SeatMap {
    let columns = (template.seats_per_row as usize).min(SEAT_LETTERS.len());

    let mut grid = Vec::with_capacity(template.rows as usize);
    for row in 1..=template.rows {
        let mut row_seats = Vec::with_capacity(columns);
        for letter in &SEAT_LETTERS[..columns] {
            let seat = format!("{}{}", row, *letter as char);
            let available = !occupied.contains(&seat);
            row_seats.push(SeatCell { seat, available });
        }
        grid.push(row_seats);
    }

    SeatMap {
        seat_map: grid,
        layout: template.layout.clone(),
        total_seats,
        available_seats: total_seats - occupied.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(rows: u32, seats_per_row: u32) -> SeatTemplate {
        SeatTemplate {
            rows,
            seats_per_row,
            layout: "3-3".to_string(),
        }
    }

    #[test]
    fn test_grid_shape_and_designators() {
        let map = generate(&template(2, 3), 6, &HashSet::new());

        assert_eq!(map.seat_map.len(), 2);
        assert_eq!(map.seat_map[0].len(), 3);
        assert_eq!(map.seat_map[0][0].seat, "1A");
        assert_eq!(map.seat_map[1][2].seat, "2C");
        assert_eq!(map.available_seats, 6);
        assert!(map.seat_map.iter().flatten().all(|cell| cell.available));
    }

    #[test]
    fn test_occupied_seats_are_flagged() {
        let occupied: HashSet<String> = ["1B".to_string()].into_iter().collect();
        let map = generate(&template(1, 2), 2, &occupied);

        assert!(map.seat_map[0][0].available);
        assert!(!map.seat_map[0][1].available);
        assert_eq!(map.available_seats, 1);
    }

    #[test]
    fn test_wide_cabin_is_clamped_to_letter_set() {
        let map = generate(&template(1, 9), 9, &HashSet::new());

        assert_eq!(map.seat_map[0].len(), 8);
        assert_eq!(map.seat_map[0].last().unwrap().seat, "1H");
    }
}
