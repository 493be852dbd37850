//! Textual, line-oriented parameter (de)serialization (spec.md §6): every
//! value is one decimal or `0`/`1` line, read/written against any
//! `io::Write`/`io::Read`, matching the "little-endian human-readable"
//! framing spec.md requires rather than a binary/bincode format. Ciphertext
//! and public-parameter bytes are delegated to the backend's own
//! [`Mmap::ciphertext_fwrite`]/[`Mmap::ciphertext_fread`] and
//! [`Mmap::public_params_fwrite`]/[`Mmap::public_params_fread`].

use crate::encoding::Encoding;
use crate::error::{ObfError, Result};
use crate::index_set::{IndexSet, Slot};
use crate::level::Level;
use crate::mmap::Mmap;
use crate::obf::lin::LinObfuscation;
use crate::obf::lz::LzObfuscation;
use crate::params::{LinParams, LzParams, SymbolParams};
use std::io::{BufRead, Write};

fn io_err(e: std::io::Error) -> ObfError {
    ObfError::AllocFailure(e.to_string())
}

fn parse_err(what: &str) -> ObfError {
    ObfError::MalformedInput(format!("expected {what}"))
}

fn read_line(r: &mut dyn BufRead) -> Result<String> {
    let mut line = String::new();
    r.read_line(&mut line).map_err(io_err)?;
    if line.is_empty() {
        return Err(parse_err("a line, found EOF"));
    }
    Ok(line.trim().to_string())
}

pub(crate) fn write_usize(w: &mut dyn Write, v: usize) -> Result<()> {
    writeln!(w, "{v}").map_err(io_err)
}

pub(crate) fn read_usize(r: &mut dyn BufRead) -> Result<usize> {
    read_line(r)?.parse().map_err(|_| parse_err("a usize"))
}

pub(crate) fn write_u32(w: &mut dyn Write, v: u32) -> Result<()> {
    writeln!(w, "{v}").map_err(io_err)
}

pub(crate) fn read_u32(r: &mut dyn BufRead) -> Result<u32> {
    read_line(r)?.parse().map_err(|_| parse_err("a u32"))
}

pub(crate) fn write_bool(w: &mut dyn Write, v: bool) -> Result<()> {
    writeln!(w, "{}", if v { 1 } else { 0 }).map_err(io_err)
}

pub(crate) fn read_bool(r: &mut dyn BufRead) -> Result<bool> {
    match read_line(r)?.as_str() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(parse_err("0 or 1")),
    }
}

/// Writes every named slot of `ix` in a fixed order: `Y`, then for each
/// symbol `k`, its `q` `S(k, *)` values, `Z(k)`, `W(k)`.
pub fn write_index_set(w: &mut dyn Write, ix: &IndexSet) -> Result<()> {
    let (c, q) = (ix.nsymbols(), ix.alphabet_size());
    write_u32(w, ix.get(Slot::Y))?;
    for k in 0..c {
        for s in 0..q {
            write_u32(w, ix.get(Slot::S(k, s)))?;
        }
        write_u32(w, ix.get(Slot::Z(k)))?;
        write_u32(w, ix.get(Slot::W(k)))?;
    }
    Ok(())
}

/// Inverse of [`write_index_set`]; `c`/`q` must match the universe used at
/// write time (recovered from the enclosing [`SymbolParams`] in practice).
pub fn read_index_set(r: &mut dyn BufRead, c: usize, q: usize) -> Result<IndexSet> {
    let mut ix = IndexSet::zero(c, q);
    ix.set(Slot::Y, read_u32(r)?);
    for k in 0..c {
        for s in 0..q {
            let v = read_u32(r)?;
            ix.set(Slot::S(k, s), v);
        }
        let z = read_u32(r)?;
        ix.set(Slot::Z(k), z);
        let wv = read_u32(r)?;
        ix.set(Slot::W(k), wv);
    }
    Ok(ix)
}

/// Writes a `Level`'s `(q+1) x (c+2)` matrix, row-major.
pub fn write_level(w: &mut dyn Write, lvl: &Level) -> Result<()> {
    let (q, c) = (lvl.q(), lvl.c());
    for row in 0..=q {
        for col in 0..c + 2 {
            write_u32(w, lvl.get(row, col))?;
        }
    }
    Ok(())
}

/// Inverse of [`write_level`]; `q`/`c` must match the universe used at
/// write time.
pub fn read_level(r: &mut dyn BufRead, q: usize, c: usize) -> Result<Level> {
    let mut lvl = Level::zero(q, c);
    for row in 0..=q {
        for col in 0..c + 2 {
            let v = read_u32(r)?;
            lvl.set(row, col, v);
        }
    }
    Ok(lvl)
}

pub fn write_symbol_params(w: &mut dyn Write, sym: &SymbolParams) -> Result<()> {
    write_usize(w, sym.c)?;
    write_usize(w, sym.ell)?;
    write_usize(w, sym.q)?;
    write_bool(w, sym.sigma)
}

pub fn read_symbol_params(r: &mut dyn BufRead) -> Result<SymbolParams> {
    Ok(SymbolParams {
        c: read_usize(r)?,
        ell: read_usize(r)?,
        q: read_usize(r)?,
        sigma: read_bool(r)?,
    })
}

pub fn write_lin_params(w: &mut dyn Write, p: &LinParams) -> Result<()> {
    write_symbol_params(w, &p.sym)?;
    write_usize(w, p.m)?;
    write_usize(w, p.gamma)?;
    write_u32(w, p.d)
}

pub fn read_lin_params(r: &mut dyn BufRead) -> Result<LinParams> {
    let sym = read_symbol_params(r)?;
    Ok(LinParams {
        m: read_usize(r)?,
        gamma: read_usize(r)?,
        d: read_u32(r)?,
        sym,
    })
}

pub fn write_lz_params(w: &mut dyn Write, p: &LzParams) -> Result<()> {
    write_symbol_params(w, &p.sym)?;
    write_usize(w, p.m)?;
    write_usize(w, p.gamma)?;
    write_usize(w, p.npowers)?;
    write_u32(w, p.cdmax)?;
    for v in &p.vdmax {
        write_u32(w, *v)?;
    }
    for v in &p.cd {
        write_u32(w, *v)?;
    }
    for row in &p.vd {
        for v in row {
            write_u32(w, *v)?;
        }
    }
    Ok(())
}

pub fn read_lz_params(r: &mut dyn BufRead) -> Result<LzParams> {
    let sym = read_symbol_params(r)?;
    let m = read_usize(r)?;
    let gamma = read_usize(r)?;
    let npowers = read_usize(r)?;
    let cdmax = read_u32(r)?;
    let vdmax: Vec<u32> = (0..sym.c).map(|_| read_u32(r)).collect::<Result<_>>()?;
    let cd: Vec<u32> = (0..gamma).map(|_| read_u32(r)).collect::<Result<_>>()?;
    let vd: Vec<Vec<u32>> = (0..sym.c)
        .map(|_| (0..gamma).map(|_| read_u32(r)).collect::<Result<_>>())
        .collect::<Result<_>>()?;
    Ok(LzParams {
        sym,
        m,
        gamma,
        npowers,
        cdmax,
        vdmax,
        cd,
        vd,
    })
}

fn write_encoding_ix<M: Mmap>(w: &mut dyn Write, e: &Encoding<M, IndexSet>) -> Result<()> {
    write_index_set(w, &e.ix)?;
    M::ciphertext_fwrite(w, &e.ct)
}

fn read_encoding_ix<M: Mmap>(
    r: &mut dyn BufRead,
    c: usize,
    q: usize,
    nslots: usize,
) -> Result<Encoding<M, IndexSet>> {
    let ix = read_index_set(r, c, q)?;
    let ct = M::ciphertext_fread(r, nslots)?;
    Ok(Encoding { ix, ct })
}

fn write_encoding_level<M: Mmap>(w: &mut dyn Write, e: &Encoding<M, Level>) -> Result<()> {
    write_level(w, &e.ix)?;
    M::ciphertext_fwrite(w, &e.ct)
}

fn read_encoding_level<M: Mmap>(
    r: &mut dyn BufRead,
    q: usize,
    c: usize,
    nslots: usize,
) -> Result<Encoding<M, Level>> {
    let ix = read_level(r, q, c)?;
    let ct = M::ciphertext_fread(r, nslots)?;
    Ok(Encoding { ix, ct })
}

/// Writes a complete LIN obfuscation.
pub fn write_lin_obfuscation<M: Mmap>(w: &mut dyn Write, obf: &LinObfuscation<M>) -> Result<()> {
    write_lin_params(w, &obf.params)?;
    M::public_params_fwrite(w, &obf.pp)?;
    let (c, q, ell, m, gamma) = (
        obf.params.sym.c,
        obf.params.sym.q,
        obf.params.sym.ell,
        obf.params.m,
        obf.params.gamma,
    );

    write_encoding_level(w, &obf.zstar)?;
    for k in 0..c {
        for s in 0..q {
            write_encoding_level(w, &obf.rks[k][s])?;
            for j in 0..ell {
                write_encoding_level(w, &obf.zksj[k][s][j])?;
            }
        }
    }
    write_encoding_level(w, &obf.rc)?;
    for j in 0..m {
        write_encoding_level(w, &obf.zcj[j])?;
    }
    for k in 0..c {
        for s in 0..q {
            for o in 0..gamma {
                write_encoding_level(w, &obf.rhatkso[k][s][o])?;
                write_encoding_level(w, &obf.zhatkso[k][s][o])?;
            }
        }
    }
    for o in 0..gamma {
        write_encoding_level(w, &obf.rhato[o])?;
        write_encoding_level(w, &obf.zhato[o])?;
    }
    for o in 0..gamma {
        write_encoding_level(w, &obf.rbaro[o])?;
        write_encoding_level(w, &obf.zbaro[o])?;
    }
    Ok(())
}

/// Inverse of [`write_lin_obfuscation`].
pub fn read_lin_obfuscation<M: Mmap>(r: &mut dyn BufRead) -> Result<LinObfuscation<M>> {
    let params = read_lin_params(r)?;
    let pp = M::public_params_fread(r)?;
    let (c, q, ell, m, gamma) = (
        params.sym.c,
        params.sym.q,
        params.sym.ell,
        params.m,
        params.gamma,
    );
    let nslots = c + 3;

    let zstar = read_encoding_level(r, q, c, nslots)?;
    let mut rks = Vec::with_capacity(c);
    let mut zksj = Vec::with_capacity(c);
    for _ in 0..c {
        let mut rks_k = Vec::with_capacity(q);
        let mut zksj_k = Vec::with_capacity(q);
        for _ in 0..q {
            rks_k.push(read_encoding_level(r, q, c, nslots)?);
            let mut zksj_s = Vec::with_capacity(ell);
            for _ in 0..ell {
                zksj_s.push(read_encoding_level(r, q, c, nslots)?);
            }
            zksj_k.push(zksj_s);
        }
        rks.push(rks_k);
        zksj.push(zksj_k);
    }
    let rc = read_encoding_level(r, q, c, nslots)?;
    let mut zcj = Vec::with_capacity(m);
    for _ in 0..m {
        zcj.push(read_encoding_level(r, q, c, nslots)?);
    }
    let mut rhatkso = Vec::with_capacity(c);
    let mut zhatkso = Vec::with_capacity(c);
    for _ in 0..c {
        let mut r_k = Vec::with_capacity(q);
        let mut z_k = Vec::with_capacity(q);
        for _ in 0..q {
            let mut r_s = Vec::with_capacity(gamma);
            let mut z_s = Vec::with_capacity(gamma);
            for _ in 0..gamma {
                r_s.push(read_encoding_level(r, q, c, nslots)?);
                z_s.push(read_encoding_level(r, q, c, nslots)?);
            }
            r_k.push(r_s);
            z_k.push(z_s);
        }
        rhatkso.push(r_k);
        zhatkso.push(z_k);
    }
    let mut rhato = Vec::with_capacity(gamma);
    let mut zhato = Vec::with_capacity(gamma);
    for _ in 0..gamma {
        rhato.push(read_encoding_level(r, q, c, nslots)?);
        zhato.push(read_encoding_level(r, q, c, nslots)?);
    }
    let mut rbaro = Vec::with_capacity(gamma);
    let mut zbaro = Vec::with_capacity(gamma);
    for _ in 0..gamma {
        rbaro.push(read_encoding_level(r, q, c, nslots)?);
        zbaro.push(read_encoding_level(r, q, c, nslots)?);
    }

    Ok(LinObfuscation {
        pp,
        params,
        zstar,
        rks,
        zksj,
        rc,
        zcj,
        rhatkso,
        zhatkso,
        rhato,
        zhato,
        rbaro,
        zbaro,
    })
}

/// Writes a complete LZ obfuscation.
pub fn write_lz_obfuscation<M: Mmap>(w: &mut dyn Write, obf: &LzObfuscation<M>) -> Result<()> {
    write_lz_params(w, &obf.params)?;
    M::public_params_fwrite(w, &obf.pp)?;
    let (c, q, ell, m, gamma) = (
        obf.params.sym.c,
        obf.params.sym.q,
        obf.params.sym.ell,
        obf.params.m,
        obf.params.gamma,
    );
    // The power chains' actual length can exceed `params.npowers` (the
    // builder enforces a minimum of 1), so it is framed explicitly rather
    // than re-derived from `params` on read.
    let npowers = obf.powers.npowers;
    write_usize(w, npowers)?;

    for k in 0..c {
        for s in 0..q {
            for j in 0..ell {
                write_encoding_ix(w, &obf.shat[k][s][j])?;
            }
        }
    }
    for j in 0..m {
        write_encoding_ix(w, &obf.yhat[j])?;
    }
    for p in 0..npowers {
        write_encoding_ix(w, &obf.powers.y[p])?;
    }
    for k in 0..c {
        for s in 0..q {
            for p in 0..npowers {
                write_encoding_ix(w, &obf.powers.s[k][s][p])?;
            }
        }
    }
    for k in 0..c {
        for s in 0..q {
            for o in 0..gamma {
                write_encoding_ix(w, &obf.zhat[k][s][o])?;
            }
        }
    }
    for k in 0..c {
        for s in 0..q {
            for o in 0..gamma {
                write_encoding_ix(w, &obf.what[k][s][o])?;
            }
        }
    }
    for o in 0..gamma {
        write_encoding_ix(w, &obf.chatstar[o])?;
    }
    Ok(())
}

/// Inverse of [`write_lz_obfuscation`].
pub fn read_lz_obfuscation<M: Mmap>(r: &mut dyn BufRead) -> Result<LzObfuscation<M>> {
    let params = read_lz_params(r)?;
    let pp = M::public_params_fread(r)?;
    let (c, q, ell, m, gamma) = (
        params.sym.c,
        params.sym.q,
        params.sym.ell,
        params.m,
        params.gamma,
    );
    let nslots = 2;
    let toplevel = crate::params::lz_toplevel(&params);
    let npowers = read_usize(r)?;

    let mut shat = Vec::with_capacity(c);
    for _ in 0..c {
        let mut row_k = Vec::with_capacity(q);
        for _ in 0..q {
            let mut row_s = Vec::with_capacity(ell);
            for _ in 0..ell {
                row_s.push(read_encoding_ix(r, c, q, nslots)?);
            }
            row_k.push(row_s);
        }
        shat.push(row_k);
    }
    let mut yhat = Vec::with_capacity(m);
    for _ in 0..m {
        yhat.push(read_encoding_ix(r, c, q, nslots)?);
    }
    let mut y = Vec::with_capacity(npowers);
    for _ in 0..npowers {
        y.push(read_encoding_ix(r, c, q, nslots)?);
    }
    let mut s = Vec::with_capacity(c);
    for _ in 0..c {
        let mut s_k = Vec::with_capacity(q);
        for _ in 0..q {
            let mut s_p = Vec::with_capacity(npowers);
            for _ in 0..npowers {
                s_p.push(read_encoding_ix(r, c, q, nslots)?);
            }
            s_k.push(s_p);
        }
        s.push(s_k);
    }
    let powers = crate::obf::lz::PowerTable { y, s, npowers };

    let mut zhat = Vec::with_capacity(c);
    for _ in 0..c {
        let mut row_k = Vec::with_capacity(q);
        for _ in 0..q {
            let mut row_s = Vec::with_capacity(gamma);
            for _ in 0..gamma {
                row_s.push(read_encoding_ix(r, c, q, nslots)?);
            }
            row_k.push(row_s);
        }
        zhat.push(row_k);
    }
    let mut what = Vec::with_capacity(c);
    for _ in 0..c {
        let mut row_k = Vec::with_capacity(q);
        for _ in 0..q {
            let mut row_s = Vec::with_capacity(gamma);
            for _ in 0..gamma {
                row_s.push(read_encoding_ix(r, c, q, nslots)?);
            }
            row_k.push(row_s);
        }
        what.push(row_k);
    }
    let mut chatstar = Vec::with_capacity(gamma);
    for _ in 0..gamma {
        chatstar.push(read_encoding_ix(r, c, q, nslots)?);
    }

    Ok(LzObfuscation {
        pp,
        params,
        shat,
        yhat,
        powers,
        zhat,
        what,
        chatstar,
        toplevel,
    })
}
