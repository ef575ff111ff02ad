// src/movegen.rs
//! Per-piece destination generation and the shared king-safety filter.
//!
//! Pseudo-legal generation follows each piece's geometry and occupancy. A destination
//! becomes legal only if playing it on a board snapshot leaves the mover's king safe.

use crate::attack::{is_in_check, king_under_attack, DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS};
use crate::board::Board;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::spot::{Spot, BOARD_SIZE};

/// Destinations consistent with the piece's movement rules, ignoring king safety.
pub fn pseudo_legal_destinations(board: &Board, id: PieceId) -> Vec<Spot> {
    let piece = board.piece(id);
    let Some(from) = piece.spot().filter(|_| piece.is_alive()) else { return Vec::new(); };
    let mut moves = Vec::new();

    match piece.kind() {
        PieceKind::Pawn => generate_pawn_moves(board, piece, from, &mut moves),
        PieceKind::Knight => generate_step_moves(board, piece, from, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::Bishop => generate_sliding_moves(board, piece, from, true, false, &mut moves),
        PieceKind::Rook => generate_sliding_moves(board, piece, from, false, true, &mut moves),
        PieceKind::Queen => generate_sliding_moves(board, piece, from, true, true, &mut moves),
        PieceKind::King => {
            generate_step_moves(board, piece, from, &KING_OFFSETS, &mut moves);
            generate_castling_moves(board, piece, from, &mut moves);
        }
    }
    moves
}

/// Pseudo-legal destinations that survive the king-safety simulation.
pub fn legal_destinations(board: &Board, id: PieceId) -> Vec<Spot> {
    pseudo_legal_destinations(board, id)
        .into_iter()
        .filter(|&dest| is_really_legal(board, id, dest))
        .collect()
}

/// Plays `id -> dest` on a snapshot (including the en passant removal) and reports
/// whether the mover's own king is safe afterwards.
pub fn is_really_legal(board: &Board, id: PieceId, dest: Spot) -> bool {
    let piece = board.piece(id);
    let Some(from) = piece.spot() else { return false; };
    let color = piece.color();
    let victim = en_passant_victim(board, id, dest);

    let mut sim = board.snapshot();
    sim.force_move(id, dest);
    if let Some(victim) = victim {
        sim.kill(victim);
    }
    debug_assert_eq!(sim.piece(id).spot(), Some(dest), "simulated move from {} went astray", from);
    !is_in_check(&sim, color)
}

/// The enemy pawn a pawn would capture en passant by moving to `dest`, if any.
/// Requires the last move on the board to be that pawn's double step landing beside the mover.
pub fn en_passant_victim(board: &Board, id: PieceId, dest: Spot) -> Option<PieceId> {
    let piece = board.piece(id);
    if piece.kind() != PieceKind::Pawn { return None; }
    let from = piece.spot()?;
    if from.col == dest.col || !board.is_empty(dest) { return None; }
    let target = en_passant_target(board, piece, from)?;
    if target != dest { return None; }
    let (_, end) = board.last_move()?;
    board.id_at(end)
}

fn en_passant_target(board: &Board, piece: &Piece, from: Spot) -> Option<Spot> {
    let (start, end) = board.last_move()?;
    let moved = board.piece_at(end)?;
    let double_step = moved.kind() == PieceKind::Pawn
        && moved.color() != piece.color()
        && (start.row - end.row).abs() == 2
        && start.col == end.col;
    if !double_step || end.row != from.row || (end.col - from.col).abs() != 1 {
        return None;
    }
    let target = Spot::new(from.row + piece.color().forward(), end.col);
    (target.is_valid() && board.is_empty(target)).then_some(target)
}

/// For a king move `from -> dest` that is a castling move, returns the rook and its
/// (origin, destination). `None` for any other move.
pub fn castling_rook(board: &Board, from: Spot, dest: Spot) -> Option<(PieceId, Spot, Spot)> {
    let king = board.piece_at(from)?;
    if king.kind() != PieceKind::King || from.row != dest.row || (dest.col - from.col).abs() != 2 {
        return None;
    }
    let step = (dest.col - from.col).signum();
    let rook_col = if step > 0 { BOARD_SIZE - 1 } else { 0 };
    let rook_from = Spot::new(from.row, rook_col);
    let rook_id = board.id_at(rook_from)?;
    let rook = board.piece(rook_id);
    if rook.kind() != PieceKind::Rook || rook.color() != king.color() {
        return None;
    }
    Some((rook_id, rook_from, Spot::new(from.row, dest.col - step)))
}

fn generate_pawn_moves(board: &Board, piece: &Piece, from: Spot, moves: &mut Vec<Spot>) {
    let dir = piece.color().forward();

    let one = from.offset(dir, 0);
    if one.is_valid() && board.is_empty(one) {
        moves.push(one);
        if !piece.has_moved() {
            let two = from.offset(2 * dir, 0);
            if two.is_valid() && board.is_empty(two) {
                moves.push(two);
            }
        }
    }

    for dc in [-1, 1] {
        let target = from.offset(dir, dc);
        if let Some(occupant) = board.piece_at(target) {
            if occupant.is_enemy(piece) {
                moves.push(target);
            }
        }
    }

    if let Some(target) = en_passant_target(board, piece, from) {
        moves.push(target);
    }
}

fn generate_step_moves(board: &Board, piece: &Piece, from: Spot, offsets: &[(i8, i8)], moves: &mut Vec<Spot>) {
    for &(dr, dc) in offsets {
        let target = from.offset(dr, dc);
        if !target.is_valid() { continue; }
        match board.piece_at(target) {
            Some(occupant) if !occupant.is_enemy(piece) => {}
            _ => moves.push(target),
        }
    }
}

fn generate_sliding_moves(board: &Board, piece: &Piece, from: Spot, diagonals: bool, orthogonals: bool, moves: &mut Vec<Spot>) {
    for &(dr, dc, is_diagonal) in DIRECTIONS.iter() {
        if (is_diagonal && !diagonals) || (!is_diagonal && !orthogonals) { continue; }
        let mut target = from.offset(dr, dc);
        while target.is_valid() {
            match board.piece_at(target) {
                None => moves.push(target),
                Some(occupant) => {
                    if occupant.is_enemy(piece) {
                        moves.push(target);
                    }
                    break;
                }
            }
            target = target.offset(dr, dc);
        }
    }
}

/// Castling: unmoved king and rook, empty squares between them, king not in check,
/// and neither the transit square nor the destination attacked.
fn generate_castling_moves(board: &Board, king: &Piece, from: Spot, moves: &mut Vec<Spot>) {
    if king.has_moved() { return; }
    let color = king.color();
    if king_under_attack(board, from, color).is_attacked() { return; }

    for rook_col in [BOARD_SIZE - 1, 0] {
        if (rook_col - from.col).abs() < 3 { continue; }
        let rook_spot = Spot::new(from.row, rook_col);
        let rook_ok = board.piece_at(rook_spot).map_or(false, |rook| {
            rook.kind() == PieceKind::Rook && rook.color() == color && !rook.has_moved()
        });
        if !rook_ok { continue; }

        let step = (rook_col - from.col).signum();
        let mut col = from.col + step;
        let mut path_clear = true;
        while col != rook_col {
            if !board.is_empty(Spot::new(from.row, col)) {
                path_clear = false;
                break;
            }
            col += step;
        }
        if !path_clear { continue; }

        let transit_safe = (1..=2).all(|n| {
            !king_under_attack(board, from.offset(0, n * step), color).is_attacked()
        });
        if transit_safe {
            moves.push(from.offset(0, 2 * step));
        }
    }
}

/// All legal (from, to) pairs for one side.
pub fn all_legal_moves(board: &Board, color: Color) -> Vec<(Spot, Spot)> {
    let mut result = Vec::new();
    for id in board.alive_ids(color) {
        let Some(from) = board.piece(id).spot() else { continue; };
        for dest in legal_destinations(board, id) {
            result.push((from, dest));
        }
    }
    result
}
