/*!

This is the long-form manual for `survey_core` and the `enquete` command line tool.

## Storage layouts

Responses are stored as rows of text cells, one response per row, in a fixed column order.
Two layouts exist. The layout is always chosen explicitly (`schemaVersion` in the
configuration or `--schema` on the command line); a store whose header row does not match
the chosen layout is refused.

### `v2` (default)

| workshops | massage_oil_rating | muscle_spray_rating | future_interests | name | email | whatsapp | feedback |
|-----------|--------------------|---------------------|------------------|------|-------|----------|----------|

Spreadsheet range: `A:H`.

### `v1`

The first layout, without the `name` column. Spreadsheet range: `A:G`.

### Multi-value cells

`workshops` and `future_interests` hold the selected labels joined with `", "`, for example
`Klepon maken, Pitjit massage`. An empty cell means that nothing was selected.

The labels are:

| workshops | slug |
|-----------|------|
| `Klepon maken` | `klepon` |
| `Pitjit massage` | `pitjit` |
| `Geen van beide, ik was toeschouwer` | `spectator` |

| future_interests | slug |
|------------------|------|
| `Workshop Jamu maken` | `jamu` |
| `Cursus Pitjit massage` | `pitjit-course` |
| `Indonesische kookcursus` | `cooking` |
| `Geen interesse op dit moment` | `none` |

## Stores

### `csv`

A local comma-separated file (UTF-8, a leading byte order mark is accepted). The header row
is written with the first response.
Cells containing commas, quotes or line breaks are quoted.

### `sheets`

A Google Sheets spreadsheet, through the Sheets REST API. The access token is obtained
out-of-band (for a service account, or for example with `gcloud auth print-access-token`)
and passed with `store.accessToken` or the `SURVEY_SHEETS_TOKEN` environment variable.
If the first row of the range is the header of the layout, it is skipped; otherwise all the
rows are read as responses in the column order above, and a row whose email cell has no `@`
or whose whatsapp cell is not only digits is refused (it usually belongs to the other layout).

Appends are not idempotent: retrying a failed append may add the same response twice.

### `xlsx` (read only)

A spreadsheet downloaded from the online form, in the Excel format. It can be used as the
input of a draw with `enquete draw --input responses.xlsx`. The same header rule as for
`sheets` applies.

## Uniqueness

Email addresses and whatsapp numbers are compared exactly (case-sensitive). The check and the
append are two separate operations on the store: two attendees submitting the same contact at
the same moment can both be recorded.

## Configuration

```json
{
  "schemaVersion": "v2",
  "surveyUrl": "https://enquete.example.com",
  "store": {
    "provider": "sheets",
    "spreadsheetId": "1AbC...",
    "sheetName": "Antwoorden"
  },
  "draw": {
    "spinCount": 20,
    "spinDelayMs": 100
  }
}
```

*/
